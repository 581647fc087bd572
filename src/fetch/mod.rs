//! Release archive download and extraction.
//!
//! Proxy builds are published as `.tar.xz` archives, one per target, each
//! holding a single executable at `envoy-{tag}-{os}-{arch}/bin/envoy`.

use crate::error::{ErrorExt, FetchError, PackageError, Result};
use crate::platform::Target;
use crate::version::EnvoyVersion;
use std::io::Read;
use std::path::Path;

/// Default host serving the release archives.
pub const DEFAULT_RELEASE_HOST: &str =
    "https://github.com/tetratelabs/archive-envoy/releases/download";

/// Location of one target's release archive.
#[derive(Debug, Clone)]
pub struct ReleaseArchive {
    /// Full download URL
    pub url: String,
    /// Path of the proxy executable inside the archive
    pub entry: String,
}

impl ReleaseArchive {
    /// Describe the archive of `target` at `version` on `host`.
    ///
    /// `host` must be an absolute http(s) URL; a trailing slash is ignored.
    pub fn new(host: &str, version: &EnvoyVersion, target: Target) -> Result<Self> {
        let parsed = url::Url::parse(host).map_err(|e| FetchError::InvalidHost {
            host: host.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidHost {
                host: host.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            }
            .into());
        }

        let tag = version.release_tag();
        let stem = format!("envoy-{}-{}-{}", tag, target.os(), target.arch());
        Ok(Self {
            url: format!("{}/{}/{}.tar.xz", host.trim_end_matches('/'), tag, stem),
            entry: format!("{stem}/bin/envoy"),
        })
    }
}

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success statuses are errors.
pub async fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = reqwest::get(url)
        .await
        .map_err(|e| FetchError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::DownloadFailed {
            url: url.to_string(),
            reason: format!("Failed to read response: {}", e),
        })?;

    log::debug!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Extracts a single entry from an in-memory `.tar.xz` archive.
///
/// Runs on the blocking pool; decompression is CPU-bound.
pub async fn extract_entry(archive: Vec<u8>, entry: &str) -> Result<Vec<u8>> {
    let entry = entry.to_string();
    tokio::task::spawn_blocking(move || extract_entry_blocking(&archive, &entry))
        .await
        .map_err(|e| PackageError::TaskFailed {
            reason: format!("Archive extraction task failed: {}", e),
        })?
}

fn extract_entry_blocking(archive: &[u8], entry: &str) -> Result<Vec<u8>> {
    let corrupt = |e: std::io::Error| FetchError::CorruptArchive {
        reason: e.to_string(),
    };

    let decoder = xz2::read::XzDecoder::new(archive);
    let mut tar = tar::Archive::new(decoder);

    for item in tar.entries().map_err(corrupt)? {
        let mut item = item.map_err(corrupt)?;
        let is_binary = item.path().map_err(corrupt)?.as_ref() == Path::new(entry);
        if is_binary {
            let mut content = Vec::with_capacity(item.size() as usize);
            item.read_to_end(&mut content).map_err(corrupt)?;
            return Ok(content);
        }
    }

    Err(FetchError::EntryNotFound {
        entry: entry.to_string(),
    }
    .into())
}

/// Download the archive of `target` and write its executable to `dest`.
///
/// Any file already at `dest` is removed first; the result is mode `0755`.
pub async fn fetch_binary(
    host: &str,
    version: &EnvoyVersion,
    target: Target,
    dest: &Path,
) -> Result<()> {
    let archive = ReleaseArchive::new(host, version, target)?;
    let bytes = download(&archive.url).await?;
    let binary = extract_entry(bytes, &archive.entry).await?;
    install_binary(&binary, dest).await
}

/// Write an executable, replacing whatever was at `dest`.
pub async fn install_binary(binary: &[u8], dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating binary directory", parent)?;
    }

    match tokio::fs::remove_file(dest).await {
        Ok(()) => log::debug!("Removed previous binary at {}", dest.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).fs_context("removing previous binary", dest),
    }

    tokio::fs::write(dest, binary)
        .await
        .fs_context("writing proxy binary", dest)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting executable permission", dest)?;
    }

    log::info!("Installed {} ({} bytes)", dest.display(), binary.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tar_xz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        let tar_bytes = builder.into_inner().unwrap();
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(&tar_bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn archive_url_uses_normalized_version() {
        let version = EnvoyVersion::parse("1.36.2.post1").unwrap();
        let archive = ReleaseArchive::new(DEFAULT_RELEASE_HOST, &version, Target::LinuxArm64).unwrap();
        assert_eq!(
            archive.url,
            "https://github.com/tetratelabs/archive-envoy/releases/download/v1.36.2/envoy-v1.36.2-linux-arm64.tar.xz"
        );
        assert_eq!(archive.entry, "envoy-v1.36.2-linux-arm64/bin/envoy");
    }

    #[test]
    fn rejects_non_http_host() {
        let version = EnvoyVersion::parse("1.36.2").unwrap();
        assert!(ReleaseArchive::new("ftp://example.com", &version, Target::LinuxAmd64).is_err());
        assert!(ReleaseArchive::new("not a url", &version, Target::LinuxAmd64).is_err());
    }

    #[tokio::test]
    async fn extracts_binary_entry() {
        let archive = tar_xz(&[
            ("envoy-v1.36.2-linux-amd64/LICENSE", b"license"),
            ("envoy-v1.36.2-linux-amd64/bin/envoy", b"\x7fELF-proxy"),
        ]);
        let binary = extract_entry(archive, "envoy-v1.36.2-linux-amd64/bin/envoy")
            .await
            .unwrap();
        assert_eq!(binary, b"\x7fELF-proxy");
    }

    #[tokio::test]
    async fn missing_entry_is_reported() {
        let archive = tar_xz(&[("envoy-v1.36.2-linux-amd64/LICENSE", b"license")]);
        let err = extract_entry(archive, "envoy-v1.36.2-linux-amd64/bin/envoy")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ShimError::Fetch(FetchError::EntryNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn install_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("_bin/envoy");
        install_binary(b"old", &dest).await.unwrap();
        install_binary(b"new", &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}

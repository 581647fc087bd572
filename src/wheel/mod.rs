//! Wheel packaging for the proxy binary.
//!
//! A wheel is a zip archive. The proxy executable is shipped as a wheel
//! script so pip installs it straight into the environment's `bin/`:
//!
//! ```text
//! envoy_server-1.36.2-py3-none-manylinux_2_31_x86_64.whl
//! ├── envoy_server-1.36.2.data/scripts/envoy
//! └── envoy_server-1.36.2.dist-info/
//!     ├── METADATA
//!     ├── WHEEL
//!     └── RECORD
//! ```
//!
//! Wheels are always built platform-independent first and then relabeled
//! with [`retag_wheel`], mirroring `wheel tags --remove --platform-tag`.

mod name;
mod record;

pub use name::WheelName;
pub use record::digest as record_digest;

use crate::error::{ErrorExt, PackageError, Result};
use crate::metadata::ProjectManifest;
use crate::platform::Target;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Name the proxy executable is installed under.
pub const SCRIPT_NAME: &str = "envoy";

/// A wheel produced by the bundle step.
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// Target whose binary the wheel carries; `None` for the fallback wheel
    pub target: Option<Target>,

    /// Path of the wheel file
    pub path: PathBuf,

    /// Size of the wheel in bytes
    pub size: u64,

    /// SHA-256 checksum (hex) for integrity verification
    pub checksum: String,
}

impl BundledArtifact {
    /// Describe a wheel already written to disk.
    pub fn from_path(target: Option<Target>, path: PathBuf) -> Result<Self> {
        use sha2::{Digest, Sha256};

        let mut file = std::fs::File::open(&path).fs_context("opening wheel", &path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0; 8192];
        let mut size = 0u64;

        loop {
            let n = file.read(&mut buffer).fs_context("reading wheel", &path)?;
            if n == 0 {
                break;
            }
            size += n as u64;
            hasher.update(&buffer[..n]);
        }

        Ok(Self {
            target,
            path,
            size,
            checksum: hex::encode(hasher.finalize()),
        })
    }
}

/// One file inside a wheel.
#[derive(Debug, Clone)]
struct WheelEntry {
    name: String,
    data: Vec<u8>,
    mode: u32,
}

impl WheelEntry {
    fn file(name: String, data: Vec<u8>) -> Self {
        Self {
            name,
            data,
            mode: 0o644,
        }
    }
}

/// Build a `py3-none-any` wheel carrying `binary` as the `envoy` script.
///
/// Returns the path of the written wheel inside `out_dir`.
pub async fn build_wheel(manifest: &ProjectManifest, binary: &Path, out_dir: &Path) -> Result<PathBuf> {
    let binary_data = tokio::fs::read(binary)
        .await
        .fs_context("reading proxy binary", binary)?;
    tokio::fs::create_dir_all(out_dir)
        .await
        .fs_context("creating output directory", out_dir)?;

    let manifest = manifest.clone();
    let out_dir = out_dir.to_path_buf();
    tokio::task::spawn_blocking(move || build_wheel_blocking(&manifest, binary_data, &out_dir))
        .await
        .map_err(|e| PackageError::TaskFailed {
            reason: format!("Wheel build task failed: {}", e),
        })?
}

fn build_wheel_blocking(
    manifest: &ProjectManifest,
    binary: Vec<u8>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let name = WheelName::universal(&manifest.distribution_name(), &manifest.version);
    let dist_info = name.dist_info_dir();

    let entries = vec![
        WheelEntry {
            name: format!("{}/scripts/{}", name.data_dir(), SCRIPT_NAME),
            data: binary,
            mode: 0o755,
        },
        WheelEntry::file(
            format!("{dist_info}/METADATA"),
            render_metadata(manifest).into_bytes(),
        ),
        WheelEntry::file(
            format!("{dist_info}/WHEEL"),
            render_wheel_file(&[name.tag()]).into_bytes(),
        ),
    ];

    let path = out_dir.join(name.to_string());
    write_wheel(&path, &dist_info, &entries)?;
    log::info!("Built {}", path.display());
    Ok(path)
}

/// Relabel a wheel with `platform_tag`, removing the original file.
///
/// Rewrites the filename, the `Tag:` lines of `WHEEL` and `RECORD`.
/// Returns the path of the relabeled wheel.
pub async fn retag_wheel(wheel: &Path, platform_tag: &str) -> Result<PathBuf> {
    let wheel = wheel.to_path_buf();
    let platform_tag = platform_tag.to_string();
    tokio::task::spawn_blocking(move || retag_wheel_blocking(&wheel, &platform_tag))
        .await
        .map_err(|e| PackageError::TaskFailed {
            reason: format!("Wheel retag task failed: {}", e),
        })?
}

fn retag_wheel_blocking(wheel: &Path, platform_tag: &str) -> Result<PathBuf> {
    let file_name = wheel
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PackageError::InvalidWheelName {
            name: wheel.display().to_string(),
        })?;
    let old_name = WheelName::parse(file_name)?;
    let new_name = old_name.with_platform(platform_tag);
    let dist_info = old_name.dist_info_dir();
    let wheel_entry = format!("{dist_info}/WHEEL");
    let record_entry = format!("{dist_info}/RECORD");

    let mut entries = read_entries(wheel, &record_entry)?;

    let wheel_file = entries
        .iter_mut()
        .find(|e| e.name == wheel_entry)
        .ok_or_else(|| PackageError::MissingWheelEntry {
            path: wheel.to_path_buf(),
            entry: wheel_entry.clone(),
        })?;
    let content = String::from_utf8_lossy(&wheel_file.data).into_owned();
    wheel_file.data = replace_platform_tags(&content, platform_tag).into_bytes();

    let dest = wheel.with_file_name(new_name.to_string());
    write_wheel(&dest, &dist_info, &entries)?;

    if dest != wheel {
        std::fs::remove_file(wheel).fs_context("removing untagged wheel", wheel)?;
    }

    log::info!("Retagged {} -> {}", old_name, new_name);
    Ok(dest)
}

fn read_entries(wheel: &Path, skip: &str) -> Result<Vec<WheelEntry>> {
    let file = std::fs::File::open(wheel).fs_context("opening wheel", wheel)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() || entry.name() == skip {
            continue;
        }
        let mut data = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut data)?;
        entries.push(WheelEntry {
            name: entry.name().to_string(),
            mode: entry.unix_mode().map(|m| m & 0o7777).unwrap_or(0o644),
            data,
        });
    }

    Ok(entries)
}

fn write_wheel(path: &Path, dist_info: &str, entries: &[WheelEntry]) -> Result<()> {
    let file = std::fs::File::create(path).fs_context("creating wheel", path)?;
    let mut zip = zip::ZipWriter::new(file);

    for entry in entries {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(entry.mode);
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }

    let record_name = format!("{dist_info}/RECORD");
    let record = record::render(
        entries.iter().map(|e| (e.name.as_str(), e.data.as_slice())),
        &record_name,
    );
    zip.start_file(
        record_name.as_str(),
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated),
    )?;
    zip.write_all(record.as_bytes())?;

    let mut file = zip.finish()?;
    file.flush().fs_context("flushing wheel", path)?;
    Ok(())
}

fn render_metadata(manifest: &ProjectManifest) -> String {
    let mut out = String::new();
    out.push_str("Metadata-Version: 2.1\n");
    out.push_str(&format!("Name: {}\n", manifest.name));
    out.push_str(&format!("Version: {}\n", manifest.version));
    if let Some(summary) = &manifest.summary {
        out.push_str(&format!("Summary: {summary}\n"));
    }
    if let Some(license) = &manifest.license {
        out.push_str(&format!("License: {license}\n"));
    }
    if let Some(requires) = &manifest.requires_python {
        out.push_str(&format!("Requires-Python: {requires}\n"));
    }
    out
}

fn render_wheel_file(tags: &[String]) -> String {
    let mut out = String::new();
    out.push_str("Wheel-Version: 1.0\n");
    out.push_str(&format!(
        "Generator: envoy-server ({})\n",
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str("Root-Is-Purelib: false\n");
    for tag in tags {
        out.push_str(&format!("Tag: {tag}\n"));
    }
    out
}

/// Swap the platform component of every `Tag:` line, dropping duplicates.
fn replace_platform_tags(wheel_file: &str, platform_tag: &str) -> String {
    let mut out = String::new();
    let mut seen = Vec::new();

    for line in wheel_file.lines() {
        if let Some(tag) = line.strip_prefix("Tag:") {
            let tag = tag.trim();
            let mut parts = tag.splitn(3, '-');
            let (Some(python), Some(abi)) = (parts.next(), parts.next()) else {
                continue;
            };
            let new_tag = format!("{python}-{abi}-{platform_tag}");
            if !seen.contains(&new_tag) {
                out.push_str(&format!("Tag: {new_tag}\n"));
                seen.push(new_tag);
            }
        } else if line.starts_with("Root-Is-Purelib:") {
            out.push_str("Root-Is-Purelib: false\n");
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

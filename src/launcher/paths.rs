//! Host path to container path translation.
//!
//! Each recognized path is made absolute and the directory containing it is
//! bind-mounted read-write. On POSIX hosts the container sees the same path.
//! On Windows hosts the drive letter becomes the first path segment, the way
//! Docker Desktop exposes host drives: `C:\a\b\file` -> `/c/a/b/file`.

use super::args::{PathFlag, ProxyArgs};
use crate::error::{LaunchError, Result};
use path_absolutize::Absolutize;
use std::fmt;
use std::path::Path;

/// Path conventions of the machine the shim runs on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HostStyle {
    /// `/`-separated paths, usable unchanged inside the container
    Posix,
    /// Drive-letter paths that need converting
    Windows,
}

impl HostStyle {
    /// Style of the current host.
    pub fn current() -> Self {
        if std::path::MAIN_SEPARATOR == '/' {
            HostStyle::Posix
        } else {
            HostStyle::Windows
        }
    }
}

/// A read-write bind mount of a host directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    /// Directory on the host
    pub host: String,
    /// Where it appears inside the container
    pub container: String,
}

impl VolumeMount {
    /// Runtime argument, e.g. `-v/etc/envoy:/etc/envoy:rw`.
    pub fn to_arg(&self) -> String {
        format!("-v{}:{}:rw", self.host, self.container)
    }
}

impl fmt::Display for VolumeMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_arg())
    }
}

/// One translated flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    /// Flag the value belonged to
    pub flag: PathFlag,
    /// Absolute path on the host
    pub host: String,
    /// Path the proxy inside the container is given
    pub container: String,
    /// Mount making `container` reachable
    pub mount: VolumeMount,
}

/// Rewritten proxy arguments and the mounts they need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Pass-through arguments followed by the rewritten path flags
    pub args: Vec<String>,
    /// Mounts in the order their flags were rewritten
    pub mounts: Vec<VolumeMount>,
}

/// Translate every recognized path in `args` for `style`.
pub fn translate(args: &ProxyArgs, style: HostStyle) -> Result<Translation> {
    let mut translation = Translation {
        args: args.passthrough.clone(),
        mounts: Vec::new(),
    };

    for (flag, raw) in args.paths() {
        let mapping = map_path(flag, raw, style)?;
        log::debug!("{} {} -> {} ({})", flag, mapping.host, mapping.container, mapping.mount);
        translation.args.push(flag.to_string());
        translation.args.push(mapping.container);
        translation.mounts.push(mapping.mount);
    }

    Ok(translation)
}

/// Translate a single flag value.
///
/// A value naming an existing directory is mounted itself; anything else
/// (including paths that do not exist yet) has its parent mounted.
pub fn map_path(flag: PathFlag, raw: &str, style: HostStyle) -> Result<PathMapping> {
    match style {
        HostStyle::Posix => {
            let resolved = absolutize(flag, raw)?;
            let is_dir = Path::new(&resolved).is_dir();
            Ok(map_posix(flag, &resolved, is_dir))
        }
        HostStyle::Windows => {
            let resolved = if has_drive(raw) {
                normalize_drive_path(raw)
            } else {
                absolutize(flag, raw)?
            };
            let is_dir = Path::new(&resolved).is_dir();
            map_windows(flag, &resolved, is_dir)
        }
    }
}

/// Resolve against the working directory and collapse `.` and `..`.
///
/// Purely lexical: symlinks are not followed.
fn absolutize(flag: PathFlag, raw: &str) -> Result<String> {
    let path = Path::new(raw)
        .absolutize()
        .map_err(|e| LaunchError::PathResolution {
            flag: flag.long_name().to_string(),
            path: raw.to_string(),
            reason: e.to_string(),
        })?;
    Ok(path.to_string_lossy().into_owned())
}

fn map_posix(flag: PathFlag, resolved: &str, is_dir: bool) -> PathMapping {
    let mount_dir = if is_dir {
        resolved.to_string()
    } else {
        Path::new(resolved)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string())
    };

    PathMapping {
        flag,
        host: resolved.to_string(),
        container: resolved.to_string(),
        mount: VolumeMount {
            host: mount_dir.clone(),
            container: mount_dir,
        },
    }
}

/// Collapse `.` and `..` in a drive-letter path; `..` stops at the drive root.
fn normalize_drive_path(raw: &str) -> String {
    let (drive, rest) = raw.split_at(2);
    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split(['\\', '/']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("{}\\{}", drive, segments.join("\\"))
}

fn has_drive(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Convert an absolute drive-letter path.
pub fn map_windows(flag: PathFlag, resolved: &str, is_dir: bool) -> Result<PathMapping> {
    if !has_drive(resolved) {
        return Err(LaunchError::PathResolution {
            flag: flag.long_name().to_string(),
            path: resolved.to_string(),
            reason: "expected a path starting with a drive letter".to_string(),
        }
        .into());
    }

    let (drive, rest) = resolved.split_at(2);
    let drive_letter = drive[..1].to_ascii_lowercase();
    let mut segments: Vec<&str> = rest.split(['\\', '/']).filter(|s| !s.is_empty()).collect();

    let file_name = if is_dir { None } else { segments.pop() };

    let host_dir = format!("{}\\{}", drive, segments.join("\\"));
    let container_dir = if segments.is_empty() {
        format!("/{drive_letter}")
    } else {
        format!("/{}/{}", drive_letter, segments.join("/"))
    };
    let container = match file_name {
        Some(name) => format!("{container_dir}/{name}"),
        None => container_dir.clone(),
    };

    Ok(PathMapping {
        flag,
        host: resolved.to_string(),
        container,
        mount: VolumeMount {
            host: host_dir,
            container: container_dir,
        },
    })
}

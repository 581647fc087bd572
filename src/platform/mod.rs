//! Proxy build targets and their wheel platform tags.
//!
//! The release archive host publishes one build per operating system and
//! architecture. Each build maps to exactly one wheel platform tag so pip
//! picks the right binary on install.
//!
//! | Target | Archive suffix | Platform tag |
//! |--------|----------------|--------------|
//! | [`Target::LinuxAmd64`] | `linux-amd64` | `manylinux_2_31_x86_64` |
//! | [`Target::LinuxArm64`] | `linux-arm64` | `manylinux_2_31_aarch64` |
//! | [`Target::DarwinArm64`] | `darwin-arm64` | `macosx_15_0_arm64` |
//!
//! There is no `darwin-amd64` build; Intel Macs, Windows and everything else
//! get the platform-independent wheel carrying the container launch shim.

use crate::error::{CliError, ShimError};
use std::fmt;
use std::str::FromStr;

/// Minimum macOS version the published binaries support.
pub const MAC_OS_TARGET: &str = "15_0";

/// Minimum glibc version the published Linux binaries link against.
pub const GLIBC_TARGET: &str = "2_31";

/// Platform tag of the platform-independent wheel.
pub const ANY_PLATFORM_TAG: &str = "any";

/// A published proxy build.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Target {
    /// Linux on x86_64.
    LinuxAmd64,
    /// Linux on aarch64.
    LinuxArm64,
    /// macOS on Apple Silicon.
    DarwinArm64,
}

impl Target {
    /// All targets in the order they are bundled.
    pub const ALL: [Target; 3] = [Target::LinuxAmd64, Target::LinuxArm64, Target::DarwinArm64];

    /// Operating system name used by the archive host.
    pub fn os(&self) -> &'static str {
        match self {
            Target::LinuxAmd64 | Target::LinuxArm64 => "linux",
            Target::DarwinArm64 => "darwin",
        }
    }

    /// Architecture name used by the archive host.
    pub fn arch(&self) -> &'static str {
        match self {
            Target::LinuxAmd64 => "amd64",
            Target::LinuxArm64 | Target::DarwinArm64 => "arm64",
        }
    }

    /// `{os}-{arch}`, as it appears in archive names.
    pub fn short_name(&self) -> String {
        format!("{}-{}", self.os(), self.arch())
    }

    /// Wheel platform tag for binaries of this target.
    pub fn platform_tag(&self) -> String {
        match self {
            Target::LinuxAmd64 => format!("manylinux_{GLIBC_TARGET}_x86_64"),
            Target::LinuxArm64 => format!("manylinux_{GLIBC_TARGET}_aarch64"),
            Target::DarwinArm64 => format!("macosx_{MAC_OS_TARGET}_arm64"),
        }
    }

    /// The target whose binary runs natively on this host, if any.
    ///
    /// Uses runtime OS detection via `std::env::consts` so the answer matches
    /// the machine, not a cross-compilation target.
    pub fn host() -> Option<Target> {
        Self::for_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    fn for_host(os: &str, arch: &str) -> Option<Target> {
        match (os, arch) {
            ("linux", "x86_64") => Some(Target::LinuxAmd64),
            ("linux", "aarch64") => Some(Target::LinuxArm64),
            ("macos", "aarch64") => Some(Target::DarwinArm64),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os(), self.arch())
    }
}

impl FromStr for Target {
    type Err = ShimError;

    /// Accepts `linux/amd64` as well as `linux-amd64`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('/', "-");
        Target::ALL
            .into_iter()
            .find(|target| target.short_name() == normalized)
            .ok_or_else(|| {
                CliError::InvalidArguments {
                    reason: format!(
                        "Unknown target '{s}'. Expected one of: linux/amd64, linux/arm64, darwin/arm64"
                    ),
                }
                .into()
            })
    }
}

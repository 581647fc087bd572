//! Wheel filename parsing.
//!
//! `{distribution}-{version}(-{build})?-{python}-{abi}-{platform}.whl`

use crate::error::{PackageError, Result};
use std::fmt;

/// Components of a wheel filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    /// Normalized distribution name
    pub distribution: String,
    /// Project version
    pub version: String,
    /// Optional build tag
    pub build: Option<String>,
    /// Python tag, e.g. `py3`
    pub python: String,
    /// ABI tag, e.g. `none`
    pub abi: String,
    /// Platform tag, e.g. `any` or `manylinux_2_31_x86_64`
    pub platform: String,
}

impl WheelName {
    /// Platform-independent `py3-none-any` wheel name.
    pub fn universal(distribution: &str, version: &str) -> Self {
        Self {
            distribution: distribution.to_string(),
            version: version.to_string(),
            build: None,
            python: "py3".to_string(),
            abi: "none".to_string(),
            platform: crate::platform::ANY_PLATFORM_TAG.to_string(),
        }
    }

    /// Parse a wheel file name (not a path).
    pub fn parse(file_name: &str) -> Result<Self> {
        let invalid = || PackageError::InvalidWheelName {
            name: file_name.to_string(),
        };

        let stem = file_name.strip_suffix(".whl").ok_or_else(invalid)?;
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid().into());
        }

        let (build, rest) = match parts.len() {
            5 => (None, &parts[2..]),
            6 => (Some(parts[2].to_string()), &parts[3..]),
            _ => return Err(invalid().into()),
        };

        Ok(Self {
            distribution: parts[0].to_string(),
            version: parts[1].to_string(),
            build,
            python: rest[0].to_string(),
            abi: rest[1].to_string(),
            platform: rest[2].to_string(),
        })
    }

    /// Same wheel, different platform tag.
    pub fn with_platform(&self, platform: &str) -> Self {
        Self {
            platform: platform.to_string(),
            ..self.clone()
        }
    }

    /// `{python}-{abi}-{platform}`
    pub fn tag(&self) -> String {
        format!("{}-{}-{}", self.python, self.abi, self.platform)
    }

    /// Directory holding the wheel's metadata files.
    pub fn dist_info_dir(&self) -> String {
        format!("{}-{}.dist-info", self.distribution, self.version)
    }

    /// Directory whose `scripts/` entries are installed into `bin/`.
    pub fn data_dir(&self) -> String {
        format!("{}-{}.data", self.distribution, self.version)
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.distribution, self.version)?;
        if let Some(build) = &self.build {
            write!(f, "-{build}")?;
        }
        write!(f, "-{}.whl", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let name = WheelName::parse("envoy_server-1.36.2.post1-py3-none-any.whl").unwrap();
        assert_eq!(name.distribution, "envoy_server");
        assert_eq!(name.version, "1.36.2.post1");
        assert_eq!(name.tag(), "py3-none-any");
        assert_eq!(
            name.with_platform("manylinux_2_31_x86_64").to_string(),
            "envoy_server-1.36.2.post1-py3-none-manylinux_2_31_x86_64.whl"
        );
    }

    #[test]
    fn keeps_build_tag() {
        let name = WheelName::parse("envoy_server-1.36.2-1-py3-none-any.whl").unwrap();
        assert_eq!(name.build.as_deref(), Some("1"));
        assert_eq!(name.to_string(), "envoy_server-1.36.2-1-py3-none-any.whl");
    }

    #[test]
    fn rejects_other_files() {
        assert!(WheelName::parse("envoy_server-1.36.2.tar.gz").is_err());
        assert!(WheelName::parse("envoy_server-py3-none-any.whl").is_err());
    }
}

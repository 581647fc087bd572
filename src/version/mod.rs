//! Release version handling.
//!
//! Package versions may carry a post-release suffix (`1.36.2.post1`) when the
//! packaging is re-released without a new proxy build. Both the release
//! archive and the container image are published under the proxy version
//! only, so the suffix is dropped before either is addressed.

use crate::error::{Result, VersionError};
use std::fmt;

const POST_RELEASE_MARKER: &str = ".post";

/// Strip a post-release suffix, keeping everything before the first `.post`.
pub fn normalize(version: &str) -> &str {
    match version.find(POST_RELEASE_MARKER) {
        Some(idx) => &version[..idx],
        None => version,
    }
}

/// A proxy release version with any post-release suffix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvoyVersion {
    version: semver::Version,
}

impl EnvoyVersion {
    /// Parse a package version, normalizing it first.
    ///
    /// A leading `v` is accepted so release tags can be passed directly.
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let normalized = normalize(trimmed);
        let version = semver::Version::parse(normalized).map_err(|source| VersionError::Invalid {
            version: normalized.to_string(),
            source,
        })?;
        Ok(Self { version })
    }

    /// Version of this package as compiled.
    pub fn current() -> Result<Self> {
        Self::parse(env!("CARGO_PKG_VERSION"))
    }

    /// Release tag used by the archive host, e.g. `v1.36.2`.
    pub fn release_tag(&self) -> String {
        format!("v{}", self.version)
    }

    /// Container image tag, e.g. `distroless-v1.36.2`.
    pub fn image_tag(&self) -> String {
        format!("distroless-{}", self.release_tag())
    }
}

impl fmt::Display for EnvoyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_truncates_post_suffix() {
        assert_eq!(normalize("1.36.2.post1"), "1.36.2");
        assert_eq!(normalize("1.36.2.post12.dev0"), "1.36.2");
        assert_eq!(normalize("1.36.2"), "1.36.2");
    }

    #[test]
    fn post_suffix_dropped_from_tag_and_release() {
        let version = EnvoyVersion::parse("1.35.0.post3").unwrap();
        assert_eq!(version.image_tag(), "distroless-v1.35.0");
        assert_eq!(version.release_tag(), "v1.35.0");
    }

    #[test]
    fn accepts_release_tag_spelling() {
        let version = EnvoyVersion::parse("v1.34.1").unwrap();
        assert_eq!(version.to_string(), "1.34.1");
    }

    #[test]
    fn rejects_garbage() {
        assert!(EnvoyVersion::parse("latest").is_err());
    }

    #[test]
    fn current_matches_package_version() {
        let version = EnvoyVersion::current().unwrap();
        assert_eq!(version.to_string(), normalize(env!("CARGO_PKG_VERSION")));
    }
}

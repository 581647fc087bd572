//! Launch configuration from the environment.
//!
//! The shim receives the proxy's own argument vector, so its settings come
//! from environment variables rather than flags.

use crate::error::Result;
use crate::version::EnvoyVersion;

/// Container runtime executable.
pub const RUNTIME_ENV: &str = "ENVOY_SERVER_CONTAINER_RUNTIME";

/// Image repository the proxy is pulled from.
pub const IMAGE_ENV: &str = "ENVOY_SERVER_IMAGE";

/// Overrides the package version the image tag is derived from.
pub const VERSION_ENV: &str = "ENVOY_SERVER_VERSION";

/// Default container runtime.
pub const DEFAULT_RUNTIME: &str = "docker";

/// Default image repository.
pub const DEFAULT_IMAGE: &str = "envoyproxy/envoy";

/// Settings for one shim invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Runtime executable name or path
    pub runtime: String,

    /// Image repository without tag
    pub image: String,

    /// Version override; `None` uses the compiled package version
    pub version: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            version: None,
        }
    }
}

impl LaunchConfig {
    /// Create config from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            runtime: non_empty(RUNTIME_ENV).unwrap_or(defaults.runtime),
            image: non_empty(IMAGE_ENV).unwrap_or(defaults.image),
            version: non_empty(VERSION_ENV),
        }
    }

    /// Proxy version the image tag is derived from.
    pub fn envoy_version(&self) -> Result<EnvoyVersion> {
        match &self.version {
            Some(version) => EnvoyVersion::parse(version),
            None => EnvoyVersion::current(),
        }
    }

    /// Fully tagged image reference, e.g. `envoyproxy/envoy:distroless-v1.36.2`.
    pub fn image_reference(&self) -> Result<String> {
        Ok(format!("{}:{}", self.image, self.envoy_version()?.image_tag()))
    }

    /// Name used in messages: `Docker` for docker, otherwise as configured.
    pub fn runtime_display_name(&self) -> String {
        let stem = std::path::Path::new(&self.runtime)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.runtime);
        if stem.eq_ignore_ascii_case(DEFAULT_RUNTIME) {
            "Docker".to_string()
        } else {
            stem.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = LaunchConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LaunchConfig::default());
        assert_eq!(config.runtime_display_name(), "Docker");
    }

    #[test]
    fn environment_overrides() {
        let config = LaunchConfig::from_lookup(lookup(&[
            (RUNTIME_ENV, "/usr/bin/podman"),
            (IMAGE_ENV, "mirror.local/envoy"),
            (VERSION_ENV, "1.34.0.post2"),
        ]));
        assert_eq!(config.runtime_display_name(), "podman");
        assert_eq!(
            config.image_reference().unwrap(),
            "mirror.local/envoy:distroless-v1.34.0"
        );
    }

    #[test]
    fn blank_values_fall_back() {
        let config = LaunchConfig::from_lookup(lookup(&[(RUNTIME_ENV, "  ")]));
        assert_eq!(config.runtime, DEFAULT_RUNTIME);
    }
}

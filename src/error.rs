//! Error types for envoy-server operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for envoy-server operations
pub type Result<T> = std::result::Result<T, ShimError>;

/// Main error type for all envoy-server operations
#[derive(Error, Debug)]
pub enum ShimError {
    /// Release download and extraction errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Wheel packaging errors
    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    /// Container launch errors
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Smoke test failures
    #[error("Smoke test failed: {0}")]
    Smoke(#[from] SmokeError),

    /// Version errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// Operation being performed (e.g., "writing proxy binary")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// ZIP archive errors
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Release download and extraction errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Release host returned an error status
    #[error("Download of {url} failed with HTTP status {status}")]
    BadStatus {
        /// Archive URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Download failed at the transport level
    #[error("Download of {url} failed: {reason}")]
    DownloadFailed {
        /// Archive URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Archive did not contain the proxy binary
    #[error("envoy binary not found in the archive (expected entry '{entry}')")]
    EntryNotFound {
        /// Entry path that was looked up
        entry: String,
    },

    /// Archive could not be decompressed or read
    #[error("Failed to read archive: {reason}")]
    CorruptArchive {
        /// Reason for the error
        reason: String,
    },

    /// Release host is not a valid base URL
    #[error("Invalid release host '{host}': {reason}")]
    InvalidHost {
        /// Host as given
        host: String,
        /// Reason for the error
        reason: String,
    },
}

/// Wheel packaging errors
#[derive(Error, Debug)]
pub enum PackageError {
    /// pyproject.toml is missing a required field
    #[error("Invalid project manifest {}: {reason}", path.display())]
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Wheel filename does not follow the wheel naming convention
    #[error("'{name}' is not a wheel filename")]
    InvalidWheelName {
        /// File name
        name: String,
    },

    /// Wheel is missing its WHEEL metadata file
    #[error("Wheel {} has no {entry} entry", path.display())]
    MissingWheelEntry {
        /// Wheel path
        path: PathBuf,
        /// Missing entry name
        entry: String,
    },

    /// Background packaging task failed
    #[error("Packaging task failed: {reason}")]
    TaskFailed {
        /// Reason for the error
        reason: String,
    },
}

/// Container launch errors
#[derive(Error, Debug)]
pub enum LaunchError {
    /// Container runtime executable not on PATH
    #[error(
        "This platform requires {runtime} to run Envoy, but {runtime} could not be found. \
         Ensure it is installed and available."
    )]
    RuntimeNotFound {
        /// Runtime display name
        runtime: String,
    },

    /// Flag value could not be turned into an absolute path
    #[error("Failed to resolve --{flag} path '{path}': {reason}")]
    PathResolution {
        /// Flag name without dashes
        flag: String,
        /// Path as given
        path: String,
        /// Reason for the error
        reason: String,
    },

    /// Flag given without a value
    #[error("argument {flag}: expected one argument")]
    MissingValue {
        /// Flag as written by the caller
        flag: String,
    },

    /// Process replacement failed
    #[error("Failed to execute {command}: {error}")]
    ExecFailed {
        /// Command that could not be executed
        command: String,
        /// The underlying error
        error: std::io::Error,
    },
}

/// Smoke test failures
#[derive(Error, Debug)]
pub enum SmokeError {
    /// Proxy binary not found
    #[error("Envoy binary not found: {reason}")]
    BinaryNotFound {
        /// Reason for the error
        reason: String,
    },

    /// Proxy exited while still being polled
    #[error("Envoy process exited prematurely ({status})")]
    ExitedPrematurely {
        /// Exit status description
        status: String,
    },

    /// Listener port never became discoverable
    #[error("Failed to get admin port from Envoy after {attempts} attempts")]
    PortNotDiscovered {
        /// Number of polling attempts made
        attempts: u32,
    },

    /// Admin API response lacked the listener address
    #[error("Unexpected admin listeners response: {reason}")]
    MalformedListeners {
        /// Reason for the error
        reason: String,
    },

    /// Data-plane response did not match
    #[error("Unexpected response body from {url}: expected {expected:?}, got {actual:?}")]
    UnexpectedBody {
        /// Requested URL
        url: String,
        /// Expected body
        expected: String,
        /// Actual body
        actual: String,
    },
}

/// Version errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version could not be parsed after normalization
    #[error("Invalid version '{version}': {source}")]
    Invalid {
        /// Normalized version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl ShimError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ShimError::Launch(LaunchError::RuntimeNotFound { .. }) => vec![
                "Install Docker: https://docs.docker.com/get-docker/".to_string(),
                "Ensure the runtime executable is on PATH".to_string(),
                "Use another runtime with ENVOY_SERVER_CONTAINER_RUNTIME=podman".to_string(),
            ],
            ShimError::Fetch(FetchError::BadStatus { status: 404, .. }) => vec![
                "Check that the release exists on the archive host".to_string(),
                "Versions are published as v<major>.<minor>.<patch>".to_string(),
            ],
            ShimError::Fetch(FetchError::DownloadFailed { .. }) | ShimError::Http(_) => vec![
                "Check network connectivity to the release host".to_string(),
                "Override the host with --release-host or ENVOY_SERVER_RELEASE_HOST".to_string(),
            ],
            ShimError::Package(PackageError::InvalidManifest { .. }) => vec![
                "Ensure pyproject.toml has a [project] table with name and version".to_string(),
            ],
            ShimError::Smoke(SmokeError::BinaryNotFound { .. }) => vec![
                "Install the wheel into the active environment: pip install envoy-server"
                    .to_string(),
                "Or pass the binary explicitly with --binary".to_string(),
            ],
            ShimError::Smoke(SmokeError::PortNotDiscovered { .. }) => vec![
                "Increase --attempts or --interval-ms for slow hosts".to_string(),
                "Run the proxy by hand to check the config is valid".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

/// Extension trait attaching path context to I/O errors.
pub trait ErrorExt<T> {
    /// Wrap an I/O error with the operation and path it concerned.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| ShimError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_runtime_message_names_runtime() {
        let err = ShimError::from(LaunchError::RuntimeNotFound {
            runtime: "Docker".to_string(),
        });
        let message = err.to_string();
        assert!(message.contains("This platform requires Docker to run Envoy"));
        assert!(message.contains("Ensure it is installed and available."));
        assert_eq!(err.recovery_suggestions().len(), 3);
    }

    #[test]
    fn fs_context_keeps_path() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.fs_context("reading manifest", "/tmp/pyproject.toml").unwrap_err();
        assert_eq!(err.to_string(), "reading manifest /tmp/pyproject.toml: gone");
    }
}

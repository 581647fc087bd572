//! Command line argument parsing.

use crate::fetch::DEFAULT_RELEASE_HOST;
use crate::platform::Target;
use crate::smoke::{DEFAULT_ATTEMPTS, DEFAULT_EXPECTED_BODY, DEFAULT_PATH};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Packaging and launch tooling for the envoy-server wheels
#[derive(Parser, Debug)]
#[command(
    name = "envoy-server",
    version,
    about = "Fetch, package and smoke-test Envoy proxy wheels",
    long_about = "Fetch prebuilt Envoy binaries, package them as platform wheels, and run them.

Usage:
  envoy-server bundle                          # all targets, version from pyproject.toml
  envoy-server bundle --target linux/arm64
  envoy-server fetch --target darwin/arm64 -o envoy
  envoy-server retag dist/envoy_server-1.36.2-py3-none-any.whl --platform-tag macosx_15_0_arm64
  envoy-server launch -- -c envoy.yaml        # run through the container shim
  envoy-server smoke --config tests/fixtures/envoy-conf.yaml"
)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// envoy-server subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch binaries and build one platform wheel per target
    Bundle {
        /// Project manifest holding name and version
        #[arg(long, default_value = "pyproject.toml")]
        manifest: PathBuf,

        /// Directory the wheels are written to
        #[arg(long, env = "ENVOY_SERVER_OUT_DIR", default_value = "dist")]
        out_dir: PathBuf,

        /// Staging directory for the fetched binary
        #[arg(long, default_value = "envoy/_bin")]
        bin_dir: PathBuf,

        /// Targets to bundle (repeatable; default: all)
        #[arg(long = "target", value_name = "OS/ARCH")]
        targets: Vec<Target>,

        /// Base URL of the release archives
        #[arg(long, env = "ENVOY_SERVER_RELEASE_HOST", default_value = DEFAULT_RELEASE_HOST)]
        release_host: String,

        /// Also build the platform-independent wheel around this launch shim binary
        #[arg(long, value_name = "PATH")]
        fallback_shim: Option<PathBuf>,
    },

    /// Download and extract a single proxy binary
    Fetch {
        /// Target to fetch (default: this host)
        #[arg(long, value_name = "OS/ARCH")]
        target: Option<Target>,

        /// Proxy version (default: version in --manifest)
        #[arg(long)]
        version: Option<String>,

        /// Project manifest used when --version is absent
        #[arg(long, default_value = "pyproject.toml")]
        manifest: PathBuf,

        /// Base URL of the release archives
        #[arg(long, env = "ENVOY_SERVER_RELEASE_HOST", default_value = DEFAULT_RELEASE_HOST)]
        release_host: String,

        /// Where to write the binary
        #[arg(short, long, default_value = "envoy")]
        output: PathBuf,
    },

    /// Relabel a wheel with a platform tag
    Retag {
        /// Wheel to relabel (removed after relabeling)
        wheel: PathBuf,

        /// New platform tag, e.g. manylinux_2_31_x86_64
        #[arg(long)]
        platform_tag: String,
    },

    /// Run the proxy through the container launch shim
    Launch {
        /// Proxy arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Start a proxy and check its listener answers
    Smoke {
        /// Proxy config with an admin interface and an ephemeral-port listener
        #[arg(long)]
        config: PathBuf,

        /// Proxy executable (default: envoy on PATH)
        #[arg(long)]
        binary: Option<PathBuf>,

        /// Polling attempts before giving up
        #[arg(long, default_value_t = DEFAULT_ATTEMPTS)]
        attempts: u32,

        /// Milliseconds between polling attempts
        #[arg(long, default_value_t = 100)]
        interval_ms: u64,

        /// Data-plane path to request
        #[arg(long, default_value = DEFAULT_PATH)]
        path: String,

        /// Expected response body
        #[arg(long, default_value = DEFAULT_EXPECTED_BODY)]
        expect: String,
    },
}

impl Command {
    /// Subcommand name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Bundle { .. } => "bundle",
            Command::Fetch { .. } => "fetch",
            Command::Retag { .. } => "retag",
            Command::Launch { .. } => "launch",
            Command::Smoke { .. } => "smoke",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Retag { platform_tag, .. } if platform_tag.trim().is_empty() => {
                Err("--platform-tag must not be empty".to_string())
            }
            Command::Retag { platform_tag, .. } if platform_tag.contains('-') => Err(format!(
                "Platform tag '{platform_tag}' must not contain '-'"
            )),
            Command::Smoke { attempts: 0, .. } => Err("--attempts must be at least 1".to_string()),
            _ => Ok(()),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_keeps_hyphenated_proxy_args() {
        let args = Args::try_parse_from([
            "envoy-server",
            "launch",
            "-c",
            "envoy.yaml",
            "--log-level",
            "error",
        ])
        .unwrap();
        let Command::Launch { args } = args.command else {
            panic!("expected launch");
        };
        assert_eq!(args, vec!["-c", "envoy.yaml", "--log-level", "error"]);
    }

    #[test]
    fn bundle_targets_parse() {
        let args = Args::try_parse_from([
            "envoy-server",
            "bundle",
            "--target",
            "linux/amd64",
            "--target",
            "darwin-arm64",
        ])
        .unwrap();
        let Command::Bundle { targets, .. } = args.command else {
            panic!("expected bundle");
        };
        assert_eq!(targets, vec![Target::LinuxAmd64, Target::DarwinArm64]);
    }

    #[test]
    fn unknown_target_rejected() {
        assert!(Args::try_parse_from(["envoy-server", "fetch", "--target", "darwin/amd64"]).is_err());
    }

    #[test]
    fn retag_tag_validation() {
        let args = Args::try_parse_from([
            "envoy-server",
            "retag",
            "x.whl",
            "--platform-tag",
            "py3-none-any",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }
}

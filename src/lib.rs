//! # envoy-server
//!
//! Ships the Envoy proxy as a Python wheel.
//!
//! The crate fetches prebuilt Envoy binaries, packages each one as a
//! platform-tagged wheel, and provides a small `envoy` launch shim that runs
//! the proxy in a container on platforms without a native build.
//!
//! ## Features
//!
//! - **Fetch**: download and extract release archives per target platform
//! - **Package**: build wheels with the binary as an installed script
//! - **Launch**: translate host paths in proxy flags to container mounts
//! - **Smoke test**: start a proxy and check its listener answers
//!
//! ## Usage
//!
//! ```bash
//! envoy-server bundle                      # wheels for all targets
//! envoy-server smoke --config envoy.yaml   # check an installed proxy
//! envoy -c envoy.yaml                      # launch shim
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod fetch;
pub mod launcher;
pub mod metadata;
pub mod platform;
pub mod smoke;
pub mod version;
pub mod wheel;

pub use cli::Args;
pub use error::{Result, ShimError};
pub use launcher::LaunchConfig;
pub use metadata::ProjectManifest;
pub use platform::Target;
pub use smoke::SmokeConfig;
pub use version::EnvoyVersion;
pub use wheel::{BundledArtifact, WheelName};

//! Container launch shim.
//!
//! Runs the proxy inside a container on platforms without a native build.
//! The shim takes the proxy's own command line, rewrites the flags that
//! name host files so they resolve inside the container, mounts their
//! directories, and replaces itself with the container runtime.
//!
//! # Module Structure
//!
//! - `args` - Recognition of path-bearing proxy flags
//! - `paths` - Host to container path translation
//! - `container` - Runtime lookup, command composition and exec
//! - `config` - Environment-driven settings

mod args;
mod config;
mod container;
mod paths;

pub use args::{PathFlag, ProxyArgs};
pub use config::{LaunchConfig, IMAGE_ENV, RUNTIME_ENV, VERSION_ENV};
pub use container::{locate_runtime, ContainerCommand};
pub use paths::{map_path, map_windows, translate, HostStyle, PathMapping, Translation, VolumeMount};

use crate::error::Result;
use std::convert::Infallible;

/// Compose the runtime command for a proxy argument vector.
///
/// The runtime is looked up before any argument is inspected, so a missing
/// runtime is reported even for malformed command lines.
pub fn plan<I, S>(config: &LaunchConfig, proxy_args: I, style: HostStyle) -> Result<ContainerCommand>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let program = locate_runtime(config)?;
    let parsed = ProxyArgs::parse(proxy_args)?;
    let translation = translate(&parsed, style)?;
    ContainerCommand::compose(program, config, translation)
}

/// Run the proxy in a container, replacing the current process.
pub fn run<I, S>(proxy_args: I) -> Result<Infallible>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = LaunchConfig::from_env();
    plan(&config, proxy_args, HostStyle::current())?.exec()
}

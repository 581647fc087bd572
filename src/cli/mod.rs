//! Command line interface for envoy-server.
//!
//! Subcommands cover the maintainer workflow: fetching and packaging the
//! proxy, relabeling wheels, launching through the container shim and
//! smoke-testing an installed proxy.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

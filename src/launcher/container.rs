//! Container runtime invocation.
//!
//! The proxy runs with host networking and no port mapping; the container
//! exists to make the binary runnable, not to isolate it.

use super::config::LaunchConfig;
use super::paths::Translation;
use crate::error::{LaunchError, Result};
use std::convert::Infallible;
use std::path::PathBuf;
use std::process::Command;

/// A fully composed runtime command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerCommand {
    /// Resolved runtime executable
    pub program: PathBuf,
    /// Name passed as `argv[0]`
    pub arg0: String,
    /// Arguments after the program name
    pub args: Vec<String>,
}

/// Locate the configured runtime on the search path.
pub fn locate_runtime(config: &LaunchConfig) -> Result<PathBuf> {
    which::which(&config.runtime).map_err(|e| {
        log::debug!("Runtime lookup for '{}' failed: {}", config.runtime, e);
        LaunchError::RuntimeNotFound {
            runtime: config.runtime_display_name(),
        }
        .into()
    })
}

impl ContainerCommand {
    /// `<runtime> run --rm --network host <mounts> <image> <args>`
    pub fn compose(program: PathBuf, config: &LaunchConfig, translation: Translation) -> Result<Self> {
        let image = config.image_reference()?;

        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--network".to_string(),
            "host".to_string(),
        ];
        args.extend(translation.mounts.iter().map(|m| m.to_arg()));
        args.push(image);
        args.extend(translation.args);

        Ok(Self {
            program,
            arg0: config.runtime.clone(),
            args,
        })
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.arg0.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replace the current process with the runtime.
    ///
    /// Only returns on failure.
    #[cfg(unix)]
    pub fn exec(self) -> Result<Infallible> {
        use std::os::unix::process::CommandExt;

        log::debug!("exec {}", self.display());
        let error = Command::new(&self.program)
            .arg0(&self.arg0)
            .args(&self.args)
            .exec();
        Err(LaunchError::ExecFailed {
            command: self.program.display().to_string(),
            error,
        }
        .into())
    }

    /// Run the runtime to completion and exit with its status.
    ///
    /// Windows has no process replacement; the shim stays as the parent.
    #[cfg(not(unix))]
    pub fn exec(self) -> Result<Infallible> {
        log::debug!("spawn {}", self.display());
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|error| LaunchError::ExecFailed {
                command: self.program.display().to_string(),
                error,
            })?;
        std::process::exit(status.code().unwrap_or(1))
    }
}

//! Fetch command implementation.

use crate::cli::RuntimeConfig;
use crate::error::{CliError, Result};
use crate::fetch::fetch_binary;
use crate::metadata::load_manifest;
use crate::platform::Target;
use crate::version::EnvoyVersion;
use std::path::PathBuf;

/// Parameters of one fetch
#[derive(Debug, Clone)]
pub(super) struct FetchRequest {
    pub target: Option<Target>,
    pub version: Option<String>,
    pub manifest: PathBuf,
    pub release_host: String,
    pub output: PathBuf,
}

/// Execute fetch command
pub(super) async fn execute_fetch(request: FetchRequest, config: &RuntimeConfig) -> Result<i32> {
    let output = config.output();

    let target = match request.target.or_else(Target::host) {
        Some(target) => target,
        None => {
            return Err(CliError::InvalidArguments {
                reason: format!(
                    "No prebuilt Envoy for {}/{}; pass --target",
                    std::env::consts::OS,
                    std::env::consts::ARCH
                ),
            }
            .into());
        }
    };

    let version = match &request.version {
        Some(version) => EnvoyVersion::parse(version)?,
        None => EnvoyVersion::parse(&load_manifest(&request.manifest)?.version)?,
    };

    let _ = output.progress(&format!("Fetching Envoy {} for {}", version, target));
    fetch_binary(&request.release_host, &version, target, &request.output).await?;
    let _ = output.success(&format!("Wrote {}", request.output.display()));
    if Target::host() != Some(target) {
        let _ = output.warn(&format!(
            "{} is a {} binary and will not run on this host",
            request.output.display(),
            target
        ));
    }
    Ok(0)
}

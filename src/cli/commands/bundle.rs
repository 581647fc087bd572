//! Bundle command implementation.
//!
//! Fetches the proxy for each target and packages it as a platform wheel.

use super::helpers::print_bundle_summary;
use crate::cli::RuntimeConfig;
use crate::error::{CliError, Result};
use crate::fetch::fetch_binary;
use crate::metadata::load_manifest;
use crate::platform::Target;
use crate::version::EnvoyVersion;
use crate::wheel::{self, BundledArtifact, SCRIPT_NAME};
use std::path::PathBuf;

/// Parameters of one bundle run
#[derive(Debug, Clone)]
pub(super) struct BundleRequest {
    pub manifest: PathBuf,
    pub out_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub targets: Vec<Target>,
    pub release_host: String,
    pub fallback_shim: Option<PathBuf>,
}

/// Execute bundle command
pub(super) async fn execute_bundle(request: BundleRequest, config: &RuntimeConfig) -> Result<i32> {
    let output = config.output();
    let manifest = load_manifest(&request.manifest)?;
    let version = EnvoyVersion::parse(&manifest.version)?;

    let targets = if request.targets.is_empty() {
        Target::ALL.to_vec()
    } else {
        request.targets
    };

    let _ = output.section(&format!("{} {}", manifest.name, manifest.version));
    let _ = output.info(&format!(
        "Envoy {} for {} target(s)",
        version.release_tag(),
        targets.len()
    ));

    let binary = request.bin_dir.join(SCRIPT_NAME);
    let mut artifacts = Vec::with_capacity(targets.len() + 1);

    for target in targets {
        let _ = output.progress(&format!("Fetching {}", target));
        fetch_binary(&request.release_host, &version, target, &binary).await?;

        let universal = wheel::build_wheel(&manifest, &binary, &request.out_dir).await?;
        let tagged = wheel::retag_wheel(&universal, &target.platform_tag()).await?;
        let _ = output.success(&format!("Packaged {}", target));

        artifacts.push(BundledArtifact::from_path(Some(target), tagged)?);
    }

    if let Some(shim) = &request.fallback_shim {
        if !shim.is_file() {
            return Err(CliError::InvalidArguments {
                reason: format!("--fallback-shim {} is not a file", shim.display()),
            }
            .into());
        }
        let _ = output.progress("Packaging container launch shim");
        let universal = wheel::build_wheel(&manifest, shim, &request.out_dir).await?;
        artifacts.push(BundledArtifact::from_path(None, universal)?);
    }

    print_bundle_summary(output, &artifacts);
    Ok(0)
}

//! Retag command implementation.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::wheel::retag_wheel;
use std::path::Path;

/// Execute retag command
pub(super) async fn execute_retag(
    wheel: &Path,
    platform_tag: &str,
    config: &RuntimeConfig,
) -> Result<i32> {
    let retagged = retag_wheel(wheel, platform_tag).await?;
    let _ = config
        .output()
        .success(&format!("Relabeled as {}", retagged.display()));
    Ok(0)
}

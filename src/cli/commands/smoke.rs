//! Smoke command implementation.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::smoke::{self, SmokeConfig};

/// Execute smoke command
pub(super) async fn execute_smoke(smoke_config: &SmokeConfig, config: &RuntimeConfig) -> Result<i32> {
    let output = config.output();
    let _ = output.progress(&format!(
        "Starting Envoy with {}",
        smoke_config.config.display()
    ));

    let report = smoke::run(smoke_config).await?;

    let _ = output.success(&format!(
        "{} answered {:?} on port {}",
        report.binary.display(),
        smoke_config.expected_body,
        report.listener_port
    ));
    let _ = output.indent(&format!(
        "admin {} (discovered after {} attempt(s))",
        report.admin_address, report.attempts
    ));
    Ok(0)
}

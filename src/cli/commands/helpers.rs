//! Shared helper functions for command execution.

use crate::cli::OutputManager;
use crate::wheel::BundledArtifact;

/// Print a summary of produced wheels
pub(super) fn print_bundle_summary(output: &OutputManager, artifacts: &[BundledArtifact]) {
    let _ = output.success(&format!("Created {} wheel(s)", artifacts.len()));

    for artifact in artifacts {
        let label = artifact
            .target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "fallback".to_string());
        let _ = output.indent(&format!(
            "📦 {} [{}] ({:.2} MB)",
            artifact.path.display(),
            label,
            artifact.size as f64 / 1_048_576.0
        ));
        let _ = output.indent(&format!("   🔐 SHA256: {}", artifact.checksum));
    }
}

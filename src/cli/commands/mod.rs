//! Command execution for the maintainer CLI.

mod bundle;
mod fetch;
mod helpers;
mod launch;
mod retag;
mod smoke;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use bundle::{BundleRequest, execute_bundle};
use fetch::{FetchRequest, execute_fetch};
use launch::execute_launch;
use retag::execute_retag;
use smoke::execute_smoke;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);
    let name = args.command.name();

    let result = match args.command {
        Command::Bundle {
            manifest,
            out_dir,
            bin_dir,
            targets,
            release_host,
            fallback_shim,
        } => {
            let request = BundleRequest {
                manifest,
                out_dir,
                bin_dir,
                targets,
                release_host,
                fallback_shim,
            };
            execute_bundle(request, &config).await
        }
        Command::Fetch {
            target,
            version,
            manifest,
            release_host,
            output,
        } => {
            let request = FetchRequest {
                target,
                version,
                manifest,
                release_host,
                output,
            };
            execute_fetch(request, &config).await
        }
        Command::Retag {
            wheel,
            platform_tag,
        } => execute_retag(&wheel, &platform_tag, &config).await,
        Command::Launch { args } => execute_launch(args),
        Command::Smoke {
            config: proxy_config,
            binary,
            attempts,
            interval_ms,
            path,
            expect,
        } => {
            let mut smoke_config = crate::smoke::SmokeConfig::new(proxy_config);
            smoke_config.binary = binary;
            smoke_config.attempts = attempts;
            smoke_config.interval = std::time::Duration::from_millis(interval_ms);
            smoke_config.path = path;
            smoke_config.expected_body = expect;
            execute_smoke(&smoke_config, &config).await
        }
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            let output = config.output();
            output.error(&format!("Command '{}' failed: {}", name, e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                let _ = output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    let _ = output.indent(&format!("• {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}

//! envoy-server - fetch, package and smoke-test Envoy proxy wheels.

use envoy_server::cli;
use envoy_server::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false);
            output.report(&e);
            process::exit(1);
        }
    }
}

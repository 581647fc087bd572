//! envoy - runs the Envoy proxy in a container.
//!
//! Installed in place of the native binary on platforms without a prebuilt
//! Envoy. All arguments are forwarded to the proxy.

use envoy_server::cli::OutputManager;
use envoy_server::launcher;
use std::process;

fn main() {
    env_logger::init();

    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());

    // Only returns if the runtime could not be started
    if let Err(e) = launcher::run(args) {
        OutputManager::new(false).report(&e);
        process::exit(1);
    }
}

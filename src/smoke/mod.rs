//! End-to-end smoke test of an installed proxy.
//!
//! Starts the proxy with a config whose listener binds an ephemeral port,
//! learns the admin address from the file the proxy writes at startup,
//! asks the admin API which port the listener got, and checks the listener
//! answers with the expected body.

mod admin;
mod process;

pub use admin::{discover_listener_port, first_listener_port, read_admin_address};
pub use process::{ProcessState, ProxyProcess};

use crate::error::{ErrorExt, Result, SmokeError};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of polling attempts.
pub const DEFAULT_ATTEMPTS: u32 = 100;

/// Default sleep between polling attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Default data-plane path.
pub const DEFAULT_PATH: &str = "/hello";

/// Default expected response body.
pub const DEFAULT_EXPECTED_BODY: &str = "Hello Python";

/// Smoke test parameters
#[derive(Debug, Clone)]
pub struct SmokeConfig {
    /// Proxy executable; `None` looks up `envoy` on PATH
    pub binary: Option<PathBuf>,

    /// Proxy config file passed with `-c`
    pub config: PathBuf,

    /// Polling attempts before giving up
    pub attempts: u32,

    /// Sleep between attempts
    pub interval: Duration,

    /// Data-plane path to request
    pub path: String,

    /// Body the listener must answer with
    pub expected_body: String,
}

impl SmokeConfig {
    /// Defaults for `config`.
    pub fn new(config: impl Into<PathBuf>) -> Self {
        Self {
            binary: None,
            config: config.into(),
            attempts: DEFAULT_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
            path: DEFAULT_PATH.to_string(),
            expected_body: DEFAULT_EXPECTED_BODY.to_string(),
        }
    }
}

/// What a successful run observed.
#[derive(Debug, Clone)]
pub struct SmokeReport {
    /// Proxy executable that was run
    pub binary: PathBuf,
    /// Admin interface address read from the address file
    pub admin_address: String,
    /// Port the listener was bound to
    pub listener_port: u16,
    /// Attempts used to discover the port
    pub attempts: u32,
}

/// Resolve the proxy executable to run.
pub fn resolve_binary(binary: Option<&PathBuf>) -> Result<PathBuf> {
    match binary {
        Some(path) if path.is_file() => Ok(path.clone()),
        Some(path) => Err(SmokeError::BinaryNotFound {
            reason: format!("{} is not a file", path.display()),
        }
        .into()),
        None => which::which("envoy").map_err(|e| {
            SmokeError::BinaryNotFound {
                reason: format!("envoy not found in PATH: {e}"),
            }
            .into()
        }),
    }
}

/// Run the smoke test described by `config`.
pub async fn run(config: &SmokeConfig) -> Result<SmokeReport> {
    let binary = resolve_binary(config.binary.as_ref())?;
    let admin_file = tempfile::NamedTempFile::new()?;
    let admin_path = admin_file.path().to_path_buf();

    let args = vec![
        "-c".to_string(),
        config.config.to_string_lossy().into_owned(),
        "--admin-address-path".to_string(),
        admin_path.to_string_lossy().into_owned(),
        "--log-level".to_string(),
        "error".to_string(),
    ];
    log::info!("Starting {} {}", binary.display(), args.join(" "));
    let process = ProxyProcess::start(binary.clone(), args);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let mut discovered = None;
    for attempt in 1..=config.attempts {
        match process.state() {
            ProcessState::NotStarted => {
                tokio::time::sleep(config.interval).await;
                continue;
            }
            ProcessState::SpawnFailed(reason) => {
                return Err(SmokeError::BinaryNotFound { reason }.into());
            }
            ProcessState::Exited(status) => {
                return Err(SmokeError::ExitedPrematurely { status }.into());
            }
            ProcessState::Running => {}
        }

        match read_admin_address(&admin_path).await {
            None => log::debug!("Waiting for admin address file to be populated"),
            Some(address) => match discover_listener_port(&client, &address).await {
                Ok(port) => {
                    discovered = Some((address, port, attempt));
                    break;
                }
                Err(e) => log::debug!("Admin interface at {} not ready: {}", address, e),
            },
        }

        tokio::time::sleep(config.interval).await;
    }

    let Some((admin_address, listener_port, attempts)) = discovered else {
        return Err(SmokeError::PortNotDiscovered {
            attempts: config.attempts,
        }
        .into());
    };
    log::info!("Listener discovered on port {} via {}", listener_port, admin_address);

    let url = format!("http://127.0.0.1:{}{}", listener_port, config.path);
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    if body != config.expected_body {
        return Err(SmokeError::UnexpectedBody {
            url,
            expected: config.expected_body.clone(),
            actual: body,
        }
        .into());
    }

    process.shutdown();
    admin_file
        .close()
        .fs_context("removing admin address file", &admin_path)?;

    Ok(SmokeReport {
        binary,
        admin_address,
        listener_port,
        attempts,
    })
}

//! Proxy admin interface queries.

use crate::error::{Result, SmokeError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ListenersResponse {
    #[serde(default)]
    listener_statuses: Vec<ListenerStatus>,
}

#[derive(Debug, Deserialize)]
struct ListenerStatus {
    #[serde(default)]
    name: Option<String>,
    local_address: Address,
}

#[derive(Debug, Deserialize)]
struct Address {
    socket_address: SocketAddress,
}

#[derive(Debug, Deserialize)]
struct SocketAddress {
    port_value: u16,
}

/// Port of the first listener in a `/listeners?format=json` response.
pub fn first_listener_port(body: &str) -> Result<u16> {
    let response: ListenersResponse =
        serde_json::from_str(body).map_err(|e| SmokeError::MalformedListeners {
            reason: e.to_string(),
        })?;

    let listener = response
        .listener_statuses
        .first()
        .ok_or_else(|| SmokeError::MalformedListeners {
            reason: "no listeners reported".to_string(),
        })?;

    log::debug!(
        "Listener {} bound to port {}",
        listener.name.as_deref().unwrap_or("<unnamed>"),
        listener.local_address.socket_address.port_value
    );
    Ok(listener.local_address.socket_address.port_value)
}

/// Contents of the admin address file, or `None` while it is still empty.
pub async fn read_admin_address(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            let address = content.trim();
            (!address.is_empty()).then(|| address.to_string())
        }
        Err(e) => {
            log::debug!("Admin address file {} not readable yet: {}", path.display(), e);
            None
        }
    }
}

/// Ask the admin interface at `admin_address` for the first listener's port.
pub async fn discover_listener_port(client: &reqwest::Client, admin_address: &str) -> Result<u16> {
    let url = format!("http://{admin_address}/listeners?format=json");
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    first_listener_port(&body)
}

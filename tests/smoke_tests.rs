#![cfg(unix)]

use envoy_server::error::{ShimError, SmokeError};
use envoy_server::smoke::{self, SmokeConfig};
use httpmock::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A fake proxy that writes `admin` to the admin address file and idles.
fn stub_proxy(dir: &Path, admin: &str) -> PathBuf {
    let script = dir.join("envoy");
    let body = format!(
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    --admin-address-path) shift; printf '%s' '{admin}' > "$1" ;;
  esac
  shift
done
exec sleep 30
"#
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn listeners_body(port: u16) -> String {
    format!(
        r#"{{"listener_statuses":[{{"name":"hello","local_address":{{"socket_address":{{"address":"127.0.0.1","port_value":{port}}}}}}}]}}"#
    )
}

fn config_for(binary: PathBuf) -> SmokeConfig {
    let mut config = SmokeConfig::new(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/envoy-conf.yaml"),
    );
    config.binary = Some(binary);
    config.attempts = 50;
    config.interval = Duration::from_millis(20);
    config
}

#[tokio::test]
async fn test_smoke_discovers_port_and_checks_body() {
    let server = MockServer::start_async().await;
    let port = server.port();
    let listeners = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/listeners")
                .query_param("format", "json");
            then.status(200).body(listeners_body(port));
        })
        .await;
    let hello = server
        .mock_async(|when, then| {
            when.method(GET).path("/hello");
            then.status(200).body("Hello Python");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let binary = stub_proxy(dir.path(), &server.address().to_string());

    let report = smoke::run(&config_for(binary.clone())).await.unwrap();

    assert_eq!(report.listener_port, server.port());
    assert_eq!(report.admin_address, server.address().to_string());
    assert_eq!(report.binary, binary);
    assert!(report.attempts >= 1);
    listeners.assert_async().await;
    hello.assert_async().await;
}

#[tokio::test]
async fn test_smoke_rejects_unexpected_body() {
    let server = MockServer::start_async().await;
    let port = server.port();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/listeners");
            then.status(200).body(listeners_body(port));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/hello");
            then.status(200).body("Hello Rust");
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let binary = stub_proxy(dir.path(), &server.address().to_string());

    let err = smoke::run(&config_for(binary)).await.unwrap_err();
    match err {
        ShimError::Smoke(SmokeError::UnexpectedBody { expected, actual, .. }) => {
            assert_eq!(expected, "Hello Python");
            assert_eq!(actual, "Hello Rust");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_smoke_gives_up_when_admin_never_answers() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/listeners");
            then.status(503);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let binary = stub_proxy(dir.path(), &server.address().to_string());
    let mut config = config_for(binary);
    config.attempts = 5;

    let err = smoke::run(&config).await.unwrap_err();
    assert!(matches!(
        err,
        ShimError::Smoke(SmokeError::PortNotDiscovered { attempts: 5 })
    ));
}

#[tokio::test]
async fn test_smoke_reports_premature_exit() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("envoy");
    std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let err = smoke::run(&config_for(script)).await.unwrap_err();
    assert!(matches!(
        err,
        ShimError::Smoke(SmokeError::ExitedPrematurely { .. })
    ));
}

#[tokio::test]
async fn test_smoke_reports_missing_binary() {
    let err = smoke::run(&config_for(PathBuf::from("/nonexistent/envoy")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShimError::Smoke(SmokeError::BinaryNotFound { .. })
    ));
}

/// Runs against a real proxy when one is installed.
#[tokio::test]
async fn test_smoke_against_installed_envoy() {
    let Ok(binary) = which::which("envoy") else {
        eprintln!("envoy not on PATH; skipping");
        return;
    };

    let mut config = config_for(binary);
    config.attempts = 100;
    config.interval = Duration::from_millis(100);

    let report = smoke::run(&config).await.unwrap();
    assert_ne!(report.listener_port, 0);
}

#![allow(dead_code)]

use std::path::Path;
use std::process::Output;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an unsigned access token for `user_id` expiring `expires_in`
/// seconds from now.
pub fn jwt(user_id: u64, role: &str, expires_in: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "exp": chrono::Utc::now().timestamp() + expires_in,
        "user_id": user_id,
        "username": format!("user{}", user_id),
        "role": role,
    });
    format!("{}.{}.sig", header, URL_SAFE_NO_PAD.encode(payload.to_string()))
}

pub fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

/// Run the CLI with an isolated data directory.
pub async fn run_cli(args: &[&str], data_dir: &Path, api_url: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_evently"))
        .args(args)
        .env("EVENTLY_DATA_DIR", data_dir)
        .env("EVENTLY_API_URL", api_url)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("EVENTLY_PASSWORD")
        .output()
        .await
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub async fn run_cli_success(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli(args, data_dir, api_url).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli(args, data_dir, api_url).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Answer the token endpoint with `access` and refresh token `r1`.
pub async fn mount_token(server: &MockServer, access: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access,
            "refresh": "r1"
        })))
        .mount(server)
        .await;
}

/// Log in as `alice` against `server`.
pub async fn login(server: &MockServer, data_dir: &Path) {
    run_cli_success(
        &["login", "--username", "alice", "--password", "secret123"],
        data_dir,
        &api_url(server),
    )
    .await;
}

use std::io::Write;
use std::net::TcpListener;
use std::process::Output;

use tempfile::NamedTempFile;

/// Find a port nothing listens on
fn get_unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Write a config pointing at the given API base URL
fn config_file(base_url: &str, cookie: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[api]
cookie = "{}"
base_url = "{}"
timeout_secs = 2

[purchase]
project_id = 85939
"#,
        cookie, base_url
    )
    .unwrap();
    file
}

/// Run the binary with the given arguments
async fn run_cli(args: &[&str]) -> Output {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_showticket"))
        .args(args)
        .env_remove("SHOWTICKET_CONFIG")
        .env("RUST_LOG", "error")
        .output()
        .await
        .expect("Failed to run showticket")
}

#[tokio::test]
async fn test_version_flag() {
    let output = run_cli(&["-v"]).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_help_flag() {
    let output = run_cli(&["--help"]).await;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--debug"));
    assert!(stdout.contains("--dry-run"));
}

#[tokio::test]
async fn test_missing_config_exits_with_error() {
    let output = run_cli(&["--config", "/nonexistent/showticket.toml"]).await;
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let file = config_file("http://127.0.0.1:1", "");
    let output = run_cli(&["--config", file.path().to_str().unwrap()]).await;
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test]
async fn test_unreachable_api_exits_with_error() {
    let base_url = format!("http://127.0.0.1:{}", get_unused_port());
    let file = config_file(&base_url, "SESSDATA=abc");
    let output = run_cli(&["--dry-run", "--config", file.path().to_str().unwrap()]).await;
    assert_eq!(output.status.code(), Some(1));
}

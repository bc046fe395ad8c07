//! CLI Integration Tests
//!
//! These tests run the `edgeaction` binary against a demo server started in
//! the test process.
//!
//! Test Scenarios:
//! 1. JSON calls with POST and GET
//! 2. File uploads, batches and binary output files
//! 3. URL and argument validation
//! 4. Server errors surfacing as a non-zero exit code
//!
//! Use `127.0.0.1` rather than `localhost` so no DNS lookup is involved.

use edgeaction_cli::demo_server;
use edgeaction_server::ServerConfig;
use serde_json::{json, Value};
use std::io::Write;
use std::process::Output;
use tokio::net::TcpListener;
use tokio::process::Command;

// ============================================================================
// Test Helpers
// ============================================================================

/// Starts the demo server and returns its base URL.
async fn start_demo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = demo_server(ServerConfig::new()).serve(listener).await;
    });

    format!("http://{}", addr)
}

/// Runs the binary with `args`.
async fn edgeaction(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edgeaction"))
        .args(args)
        .output()
        .await
        .expect("Failed to run edgeaction binary")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "call failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// JSON Calls
// ============================================================================

#[tokio::test]
async fn test_call_echo_with_json_arguments() {
    let base = start_demo_server().await;
    let url = format!("{}/echo", base);

    let output = edgeaction(&["call", &url, "-a", r#"["hello", 42, {"a": [1, 2]}]"#]).await;
    assert_eq!(
        stdout_json(&output),
        json!({"method": "POST", "arguments": ["hello", 42, {"a": [1, 2]}]})
    );
}

#[tokio::test]
async fn test_call_echo_with_get() {
    let base = start_demo_server().await;
    let url = format!("{}/echo", base);

    let output = edgeaction(&["call", &url, "-m", "get", "-a", r#"["a b&c", null]"#]).await;
    assert_eq!(
        stdout_json(&output),
        json!({"method": "GET", "arguments": ["a b&c", null]})
    );
}

// ============================================================================
// File Calls
// ============================================================================

#[tokio::test]
async fn test_call_echo_with_files_and_batch() {
    let base = start_demo_server().await;
    let url = format!("{}/echo", base);

    let mut single = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    single.write_all(b"{}").unwrap();
    let mut first = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    first.write_all(b"first").unwrap();
    let mut second = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    second.write_all(b"second!").unwrap();

    let single_path = single.path().display().to_string();
    let first_path = first.path().display().to_string();
    let second_path = second.path().display().to_string();

    let output = edgeaction(&[
        "call",
        &url,
        "-a",
        r#"["tag"]"#,
        "-f",
        &single_path,
        "--batch",
        &first_path,
        "--batch",
        &second_path,
    ])
    .await;

    let value = stdout_json(&output);
    let arguments = value["arguments"].as_array().unwrap();
    assert_eq!(arguments.len(), 3);
    assert_eq!(arguments[0], json!("tag"));
    assert_eq!(arguments[1]["type"], json!("application/json"));
    assert_eq!(arguments[1]["size"], json!(2));
    assert_eq!(arguments[2][0]["size"], json!(5));
    assert_eq!(arguments[2][1]["size"], json!(7));
}

#[tokio::test]
async fn test_call_upload_writes_output_file() {
    let base = start_demo_server().await;
    let url = format!("{}/upload", base);

    let mut input = tempfile::NamedTempFile::new().unwrap();
    let bytes: Vec<u8> = (0..=255u8).collect();
    input.write_all(&bytes).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("copy.bin");
    let input_path = input.path().display().to_string();
    let out_arg = out_path.display().to_string();

    let output = edgeaction(&["call", &url, "-f", &input_path, "-o", &out_arg]).await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());
    assert_eq!(std::fs::read(&out_path).unwrap(), bytes);
}

// ============================================================================
// Validation and Errors
// ============================================================================

#[tokio::test]
async fn test_call_rejects_url_without_scheme() {
    let output = edgeaction(&["call", "127.0.0.1:8787/echo"]).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must start with http:// or https://"));
}

#[tokio::test]
async fn test_call_rejects_non_array_arguments() {
    let output = edgeaction(&["call", "http://127.0.0.1:9/echo", "-a", r#"{"a": 1}"#]).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Arguments must be a JSON array"));
}

#[tokio::test]
async fn test_call_unconfigured_verb_fails() {
    let base = start_demo_server().await;
    let url = format!("{}/upload", base);

    let output = edgeaction(&["call", &url, "-m", "DELETE"]).await;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error when calling action"));
    assert!(stderr.contains("405"));
}

#[tokio::test]
async fn test_call_file_with_get_fails_before_sending() {
    let mut input = tempfile::NamedTempFile::new().unwrap();
    input.write_all(b"data").unwrap();
    let input_path = input.path().display().to_string();

    let output =
        edgeaction(&["call", "http://127.0.0.1:9/echo", "-m", "GET", "-f", &input_path]).await;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be sent with GET"));
}

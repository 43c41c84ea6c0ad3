//! Golden tests for verifying JSON output format stability
//!
//! Every case here fails before a request leaves the machine, so no blob
//! store is needed.
//!
//! Run with: `cargo test --features golden`

#![cfg(feature = "golden")]

use std::process::{Command, Output};

use tempfile::TempDir;

const TEST_TOKEN: &str = "vercel_blob_rw_golden_secret";

/// Run `vb` in an isolated config directory
fn vb(temp_dir: &TempDir, args: &[&str], token: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_vb"));
    command
        .args(args)
        .current_dir(temp_dir.path())
        .env("VBLOB_CONFIG_DIR", temp_dir.path())
        .env("VERCEL_BLOB_API_URL", "http://127.0.0.1:9")
        .env_remove("BLOB_READ_WRITE_TOKEN")
        .env_remove("RUST_LOG");
    if let Some(token) = token {
        command.env("BLOB_READ_WRITE_TOKEN", token);
    }
    command.output().expect("Failed to execute vb")
}

fn stderr_json(output: &Output) -> serde_json::Value {
    let stderr = String::from_utf8_lossy(&output.stderr);
    serde_json::from_str(&stderr).expect("Error output should be valid JSON")
}

#[test]
fn test_ls_without_token_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = vb(&temp_dir, &["ls", "--json"], None);

    // USAGE_ERROR
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty(), "Nothing should reach stdout");
    insta::assert_json_snapshot!("ls_without_token", stderr_json(&output));
}

#[test]
fn test_put_invalid_pathname_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("hello.txt"), "hello").unwrap();

    let output = vb(
        &temp_dir,
        &["put", "hello.txt", "docs//hello.txt", "--json"],
        Some(TEST_TOKEN),
    );

    assert_eq!(output.status.code(), Some(2));
    insta::assert_json_snapshot!("put_invalid_pathname", stderr_json(&output));
}

#[test]
fn test_put_missing_file_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = vb(&temp_dir, &["put", "missing.bin", "--json"], Some(TEST_TOKEN));

    assert_eq!(output.status.code(), Some(2));
    let json = stderr_json(&output);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to read missing.bin")
    );
}

#[test]
fn test_get_missing_directory_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = vb(
        &temp_dir,
        &[
            "get",
            "https://store.public.blob.vercel-storage.com/a.txt",
            "missing-dir",
            "--json",
        ],
        None,
    );

    // GENERAL_ERROR
    assert_eq!(output.status.code(), Some(1));
    insta::assert_json_snapshot!("get_missing_directory", stderr_json(&output));
}

#[test]
fn test_rm_without_urls_is_usage_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = vb(&temp_dir, &["rm"], Some(TEST_TOKEN));

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_completions() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = vb(&temp_dir, &["completions", "bash"], None);

    assert!(output.status.success());
    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains("vb"));
    assert!(script.contains("put"));
}

#![cfg(feature = "cli")]

use std::process::Command;

fn logship() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_logship"));
    command
        .env_remove("LOGSHIP_TOKEN")
        .env_remove("LOGSHIP_ENDPOINT")
        .arg("--log-level")
        .arg("error");
    command
}

#[test]
fn digest_of_empty_string() {
    let output = logship()
        .args(["--format", "raw", "digest", ""])
        .output()
        .expect("digest should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "d41d8cd98f00b204e9800998ecf8427e"
    );
}

#[test]
fn keyed_digest_reports_hmac() {
    let output = logship()
        .args([
            "--format",
            "json",
            "digest",
            "what do ya want for nothing?",
            "--key",
            "Jefe",
        ])
        .output()
        .expect("digest should run");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["algorithm"], "hmac-md5");
    assert_eq!(json["digest"], "750c783e6ab0b503eaa86e310a5db738");
}

#[test]
fn raw_digest_writes_sixteen_bytes() {
    let output = logship()
        .args(["digest", "abc", "--raw"])
        .output()
        .expect("digest should run");

    assert!(output.status.success());
    assert_eq!(output.stdout.len(), 16);
}

#[test]
fn send_without_token_returns_usage() {
    let output = logship()
        .args(["send", "--data", "hello"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("token is required"));
}

#[test]
fn send_to_unreachable_collector_fails() {
    let output = logship()
        .args([
            "--format",
            "json",
            "send",
            "test_token",
            "--data",
            "hello",
            "--insecure",
            "--endpoint",
            "127.0.0.1:9",
            "--timeout",
            "10s",
        ])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["url"], "http://127.0.0.1:9/logs/test_token");
    assert_eq!(json["failed"], 1);
    assert_eq!(json["disabled"], true);
}

#[test]
fn send_uses_endpoint_from_environment() {
    let output = logship()
        .env("LOGSHIP_ENDPOINT", "127.0.0.1:9")
        .args([
            "--format",
            "json",
            "send",
            "test_token",
            "--data",
            "hello",
            "--insecure",
            "--timeout",
            "10s",
        ])
        .output()
        .expect("send should run");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["url"], "http://127.0.0.1:9/logs/test_token");
    assert_eq!(json["dispatched"], 1);
}

#[test]
fn configured_endpoint_wins_over_environment() {
    let output = logship()
        .env("LOGSHIP_ENDPOINT", "127.0.0.2:9")
        .args([
            "--format",
            "json",
            "send",
            "test_token",
            "--data",
            "hello",
            "--insecure",
            "--endpoint",
            "127.0.0.1:9",
            "--timeout",
            "10s",
        ])
        .output()
        .expect("send should run");

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["url"], "http://127.0.0.1:9/logs/test_token");
}

#[test]
fn version_prints_package_version() {
    let output = logship().arg("version").output().expect("version should run");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("logship {}", env!("CARGO_PKG_VERSION"))
    );
}

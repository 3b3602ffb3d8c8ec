//! The `feedsync` binary end to end.

use std::process::Command;

#[test]
fn test_failed_command_reports_error_once() {
    // Nothing listens on port 1.
    let output = Command::new(env!("CARGO_BIN_EXE_feedsync"))
        .args(["delete", "7"])
        .env("FEEDSYNC_BASE_URL", "http://127.0.0.1:1")
        .env("FEEDSYNC_REQUEST_TIMEOUT_SECS", "2")
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("Error:").count(), 1, "stderr was: {}", stderr);
    assert!(stderr.contains("transport error"));
}

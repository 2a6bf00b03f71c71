//! Shared integration-test helpers for running the `anchornav` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

/// Absolute path of a file under `tests/fixtures`.
#[must_use]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the binary with `args` and waits for it to exit.
///
/// Logging is silenced and no settings file is discovered from the
/// working directory.
#[allow(clippy::missing_panics_doc)]
pub fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_anchornav"))
        .args(args)
        .arg("--quiet")
        .current_dir(std::env::temp_dir())
        .env_remove("ANCHORNAV_CONFIG")
        .env_remove("ANCHORNAV_EVENTS_FILE")
        .output()
        .expect("failed to spawn anchornav")
}

/// Lossy stdout of `output`.
#[must_use]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Lossy stderr of `output`.
#[must_use]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Parses stdout as one JSON document.
#[allow(clippy::missing_panics_doc)]
#[must_use]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    let text = stdout(output);
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {text}"))
}

//! Integration tests for the `bridge` CLI.
//!
//! Each test points `BRIDGE_CONFIG` at a temp directory, runs `bridge` as a
//! subprocess and checks stdout, stderr and the config file. Nothing here
//! needs a running backend.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use pretty_assertions::assert_eq;

/// Port 9 (discard) is closed on test machines, so requests fail fast
const UNREACHABLE: &str = "http://127.0.0.1:9/api";

fn config_file(dir: &Path) -> PathBuf {
    dir.join("bridge").join("config.toml")
}

/// Run `bridge` with its config in `dir`. Returns (stdout, stderr, success).
fn run_bridge(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_bridge"))
        .args(args)
        .current_dir(dir)
        .env("BRIDGE_CONFIG", config_file(dir))
        .env_remove("BRIDGE_API_URL")
        .env_remove("BRIDGE_LOG")
        .output()
        .expect("failed to run bridge");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `bridge` expecting success, return stdout.
fn run_bridge_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_bridge(dir, args);
    if !success {
        panic!(
            "bridge {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `bridge` expecting failure, return stderr.
fn run_bridge_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_bridge(dir, args);
    if success {
        panic!("bridge {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_show_defaults_without_a_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bridge_ok(tmp.path(), &["config", "show"]);
    assert!(out.contains("base_url: http://localhost:8000/api"));
    assert!(out.contains("timeout:  30s"));
    assert!(!config_file(tmp.path()).exists());
}

#[test]
fn config_set_url_writes_and_preserves_comments() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = config_file(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "# team settings\n[log]\nlevel = \"info\"\n").unwrap();

    let out = run_bridge_ok(tmp.path(), &["config", "set-url", "http://planner:8000/api"]);
    assert_eq!(out.trim(), "base_url = http://planner:8000/api");

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("# team settings\n"));
    assert!(written.contains("base_url = \"http://planner:8000/api\""));

    let json = run_bridge_ok(tmp.path(), &["config", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["base_url"], "http://planner:8000/api");
    assert_eq!(value["log_level"], "info");
}

#[test]
fn config_set_url_rejects_non_http() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bridge_err(tmp.path(), &["config", "set-url", "planner:8000"]);
    assert!(err.contains("error: invalid base url"));
    assert!(!config_file(tmp.path()).exists());
}

#[test]
fn api_url_flag_overrides_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_bridge_ok(
        tmp.path(),
        &["--api-url", "http://other:9000/api", "config", "show"],
    );
    assert!(out.contains("base_url: http://other:9000/api"));
}

// ---------------------------------------------------------------------------
// Commands that need a project or a backend
// ---------------------------------------------------------------------------

#[test]
fn tasks_without_project_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bridge_err(tmp.path(), &["tasks", "list"]);
    assert!(err.contains("error: no project given"));
}

#[test]
fn unreachable_backend_reports_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bridge_err(tmp.path(), &["--api-url", UNREACHABLE, "-p", "3", "tasks", "list"]);
    assert!(err.contains("error: request failed"));
}

#[test]
fn unknown_task_type_is_rejected_before_any_request() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bridge_err(
        tmp.path(),
        &["--api-url", UNREACHABLE, "users", "--type", "qa"],
    );
    assert!(err.contains("unknown task type 'qa'"));
}

#[test]
fn prd_submit_requires_text() {
    let tmp = tempfile::TempDir::new().unwrap();
    let prd = tmp.path().join("prd.md");
    fs::write(&prd, "   \n").unwrap();
    let err = run_bridge_err(
        tmp.path(),
        &[
            "--api-url",
            UNREACHABLE,
            "prd",
            "submit",
            "--title",
            "Shop",
            prd.to_str().unwrap(),
        ],
    );
    assert!(err.contains("PRD text are required"));
}

#[test]
fn prd_submit_missing_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_bridge_err(
        tmp.path(),
        &["--api-url", UNREACHABLE, "prd", "submit", "--title", "Shop", "nope.md"],
    );
    assert!(err.contains("could not read nope.md"));
}

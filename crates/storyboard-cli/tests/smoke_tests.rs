//! Smoke tests for the storyboard CLI

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the storyboard binary
fn storyboard() -> Command {
    Command::cargo_bin("storyboard").expect("storyboard binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    storyboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_lists_subcommands() {
    storyboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_no_args_fails() {
    storyboard().assert().failure();
}

// ============================================================================
// Run / Timeline
// ============================================================================

#[test]
fn test_run_builtin_script() {
    storyboard()
        .args(["run", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage 1"))
        .stdout(predicate::str::contains("Stage 3"));
}

#[test]
fn test_run_json_output() {
    let output = storyboard()
        .args(["run", "--format", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["outline"].as_array().unwrap().len(), 3);
    assert!(parsed["summary"]["elapsed_secs"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_timeline_to_stdout() {
    storyboard()
        .arg("timeline")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"scene_id\""))
        .stdout(predicate::str::contains("title:enter"));
}

// ============================================================================
// Init / Validate
// ============================================================================

#[test]
fn test_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frost.yaml");

    storyboard()
        .args(["init", path.to_str().unwrap()])
        .assert()
        .success();
    assert!(fs::read_to_string(&path).unwrap().contains("participants"));

    storyboard()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_missing_file() {
    storyboard()
        .args(["validate", "/nonexistent/script.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Script file not found"));
}

#[test]
fn test_validate_bad_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "version: \"9.9\"\nparticipants: []\nstages: []\n").unwrap();

    storyboard()
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

// ============================================================================
// Check
// ============================================================================

#[test]
fn test_exported_timeline_checks_against_itself() {
    let dir = TempDir::new().unwrap();
    let timeline_path = dir.path().join("timeline.json");
    let observed_path = dir.path().join("observed.json");

    storyboard()
        .args(["run", "-q", "--output", timeline_path.to_str().unwrap()])
        .assert()
        .success();

    let timeline: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&timeline_path).unwrap()).unwrap();
    let observed: Vec<serde_json::Value> = timeline["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e["name"],
                "time_secs": e["expected_secs"],
            })
        })
        .collect();
    fs::write(&observed_path, serde_json::to_string(&observed).unwrap()).unwrap();

    storyboard()
        .args([
            "check",
            "--timeline",
            timeline_path.to_str().unwrap(),
            "--observed",
            observed_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verdict: PASS"));
}

#[test]
fn test_check_fails_when_nothing_observed() {
    let dir = TempDir::new().unwrap();
    let timeline_path = dir.path().join("timeline.json");
    let observed_path = dir.path().join("observed.json");
    fs::write(&observed_path, "[]").unwrap();

    storyboard()
        .args(["timeline", "-o", timeline_path.to_str().unwrap()])
        .assert()
        .success();

    storyboard()
        .args([
            "check",
            "--timeline",
            timeline_path.to_str().unwrap(),
            "--observed",
            observed_path.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Verdict: FAIL"))
        .stderr(predicate::str::contains("Verification failed"));
}

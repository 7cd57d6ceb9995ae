//! Integration tests for `logsift rules` and `logsift config`.
//!
//! Runs the built `logsift` binary against rule trees and configs in a temp dir.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn logsift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_logsift"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should run logsift binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_rule_tree(dir: &Path) {
    fs::write(
        dir.join("syslog.rules"),
        r#"{"logic":[
            {"condition":"$0==kernel:","message":"kernel: $1","level":"notice"},
            {"include":"auth.rules"}
        ]}"#,
    )
    .expect("should write root rules");
    fs::write(
        dir.join("auth.rules"),
        r#"{"logic":[{"condition":"$1==sshd*","message":"ssh on $0","level":"warn"}]}"#,
    )
    .expect("should write included rules");
}

fn write_config(dir: &Path) -> String {
    let config_path = dir.join("logsift.toml");
    fs::write(
        &config_path,
        format!(
            "[server]\nrules_dir = \"{}\"\n\n[sinks.database]\npassword = \"s3cret\"\n",
            dir.display()
        ),
    )
    .expect("should write config");
    config_path.display().to_string()
}

#[test]
fn test_rules_validate_valid_tree() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_rule_tree(temp_dir.path());
    let root = temp_dir.path().join("syslog.rules");

    let output = logsift(&[
        "--output",
        "json",
        "rules",
        "validate",
        "--rules",
        root.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success(), "valid tree should pass");
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("json report on stdout");
    assert_eq!(report["valid"].as_bool(), Some(true));
    assert_eq!(report["rules"].as_u64(), Some(2));
}

#[test]
fn test_rules_validate_cycle_exits_with_rule_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let root = temp_dir.path().join("loop.rules");
    fs::write(&root, r#"{"logic":[{"include":"loop.rules"}]}"#).expect("write");

    let output = logsift(&[
        "--output",
        "json",
        "rules",
        "validate",
        "--rules",
        root.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(3), "rule errors exit with 3");
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("json report on stdout");
    assert_eq!(report["valid"].as_bool(), Some(false));
    assert!(
        report["error"]
            .as_str()
            .expect("error message")
            .contains("cycle")
    );
}

#[test]
fn test_rules_list_uses_config_rules_dir() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_rule_tree(temp_dir.path());
    let config_path = write_config(temp_dir.path());

    let output = logsift(&["-c", &config_path, "--output", "json", "rules", "list"]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("json report on stdout");
    assert_eq!(report["total"].as_u64(), Some(2));
    assert_eq!(report["rules"][1]["condition"].as_str(), Some("$1==sshd*"));
}

#[test]
fn test_rules_test_reports_matching_rule() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_rule_tree(temp_dir.path());
    let config_path = write_config(temp_dir.path());

    let output = logsift(&[
        "-c",
        &config_path,
        "--output",
        "json",
        "rules",
        "test",
        "host1 sshd[2201]: Failed password",
    ]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("json report on stdout");
    assert_eq!(report["matched_rule"].as_u64(), Some(1));
    assert_eq!(report["result"]["message"].as_str(), Some("ssh on host1"));
    assert_eq!(report["result"]["level"].as_str(), Some("warn"));
}

#[test]
fn test_config_validate_missing_file_exits_with_config_error() {
    let output = logsift(&["-c", "/nonexistent/logsift.toml", "config", "validate"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("INVALID"));
}

#[test]
fn test_config_show_redacts_password() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path());

    let output = logsift(&["-c", &config_path, "config", "show", "--section", "sinks"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(!text.contains("s3cret"), "password must not be printed");
    assert!(text.contains("***REDACTED***"));
}

#[test]
fn test_config_show_unknown_section_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = write_config(temp_dir.path());

    let output = logsift(&["-c", &config_path, "config", "show", "--section", "ebpf"]);
    assert_eq!(output.status.code(), Some(1));
}

//! CLI tests for the tc-core binary.
//!
//! Every command is pointed at an explicit engine.json so the host's own
//! configuration never leaks into the assertions.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tc_config::ConfigTree;
use tc_core::exit_codes::ExitCode;
use tempfile::TempDir;

fn tc_core(dir: &TempDir) -> Command {
    let engine = dir.path().join("engine.json");
    if !engine.exists() {
        fs::write(&engine, "{}").unwrap();
    }
    let mut cmd = cargo_bin_cmd!("tc-core");
    cmd.timeout(Duration::from_secs(60));
    cmd.arg("--config").arg(engine);
    cmd.arg("-q");
    cmd
}

fn write_tree(dir: &TempDir, name: &str, tree: &ConfigTree) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(tree).unwrap()).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn templates_lists_builtins() {
    let dir = TempDir::new().unwrap();
    let out = tc_core(&dir).arg("templates").assert().success();
    let json = stdout_json(&out.get_output().stdout);
    let names: Vec<&str> = json["templates"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["demo", "enterprise", "startup"]);
}

#[test]
fn templates_includes_custom_dir() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(templates.join("agency.json"), r#"{"name":"Agency"}"#).unwrap();

    tc_core(&dir)
        .args(["--format", "text", "templates", "--templates-dir"])
        .arg(&templates)
        .assert()
        .success()
        .stdout(predicate::str::contains("agency"))
        .stdout(predicate::str::contains("custom"));
}

#[test]
fn resolve_acme_from_demo() {
    let dir = TempDir::new().unwrap();
    let overrides = dir.path().join("acme.json");
    fs::write(&overrides, r#"{"name":"Acme"}"#).unwrap();

    let out = tc_core(&dir)
        .args(["resolve", "--tenant", "acme", "--template", "demo", "--overrides"])
        .arg(&overrides)
        .assert()
        .success();
    let tree = stdout_json(&out.get_output().stdout);
    assert_eq!(tree["id"], "acme");
    assert_eq!(tree["name"], "Acme");
    assert_eq!(tree["subdomain"], "demo");
    assert_eq!(tree["metadata"]["plan"], "professional");
}

#[test]
fn resolve_stacks_comma_separated_templates() {
    let dir = TempDir::new().unwrap();
    let out = tc_core(&dir)
        .args(["resolve", "--tenant", "acme", "--template", "demo,enterprise"])
        .assert()
        .success();
    let tree = stdout_json(&out.get_output().stdout);
    assert_eq!(tree["subdomain"], "enterprise");
    assert_eq!(tree["metadata"]["plan"], "enterprise");
    assert_eq!(tree["branding"]["colors"]["primary"], "#7C3AED");
}

#[test]
fn resolve_with_missing_overrides_is_not_found() {
    let dir = TempDir::new().unwrap();
    tc_core(&dir)
        .args(["resolve", "--tenant", "acme", "--template", "demo", "--overrides"])
        .arg(dir.path().join("absent.json"))
        .assert()
        .code(ExitCode::NotFound.as_i32());
}

#[test]
fn validate_reports_bad_subdomain() {
    let dir = TempDir::new().unwrap();
    let mut tree = ConfigTree::baseline();
    tree.subdomain = "Demo_1".to_string();
    let path = write_tree(&dir, "bad.json", &tree);

    let out = tc_core(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .code(ExitCode::ValidationFailed.as_i32());
    let report = stdout_json(&out.get_output().stdout);
    assert_eq!(report["valid"], false);
    assert!(report["errors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["field"] == "subdomain"));
}

#[test]
fn validate_accepts_good_tree() {
    let dir = TempDir::new().unwrap();
    let mut tree = ConfigTree::baseline();
    tree.subdomain = "demo-1".to_string();
    let path = write_tree(&dir, "good.json", &tree);

    tc_core(&dir)
        .args(["--format", "text", "validate"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_missing_file() {
    let dir = TempDir::new().unwrap();
    tc_core(&dir)
        .arg("validate")
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(ExitCode::NotFound.as_i32())
        .stderr(predicate::str::contains("\"code\""));
}

#[test]
fn validate_malformed_file_is_args_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ nope").unwrap();
    tc_core(&dir)
        .arg("validate")
        .arg(&path)
        .assert()
        .code(ExitCode::ArgsError.as_i32());
}

#[test]
fn stylesheet_text_ends_with_custom_css() {
    let dir = TempDir::new().unwrap();
    let mut tree = ConfigTree::baseline();
    tree.branding.custom_css = Some(".card { border: 0; }".to_string());
    let path = write_tree(&dir, "tree.json", &tree);

    tc_core(&dir)
        .args(["--format", "text", "stylesheet"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(":root {"))
        .stdout(predicate::str::ends_with(".card { border: 0; }\n"));
}

#[test]
fn env_json_and_text() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "tree.json", &ConfigTree::baseline());

    let out = tc_core(&dir).arg("env").arg(&path).assert().success();
    let env = stdout_json(&out.get_output().stdout);
    assert_eq!(env["TENANT_ID"], "default");
    assert_eq!(env.as_object().unwrap().len(), 25);

    tc_core(&dir)
        .args(["--format", "text", "env"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("TENANT_NAME=\"Default Tenant\""));
}

#[test]
fn usage_reports_percentages() {
    let dir = TempDir::new().unwrap();
    let mut tree = ConfigTree::baseline();
    tree.limits.users.max = 50;
    tree.limits.users.current = 40;
    tree.limits.custom_domains.max = 0;
    let path = write_tree(&dir, "tree.json", &tree);

    let out = tc_core(&dir).arg("usage").arg(&path).assert().success();
    let report = stdout_json(&out.get_output().stdout);
    assert_eq!(report["users"]["percentage"], 80);
    assert_eq!(report["customDomains"]["percentage"], 0);
}

#[test]
fn identify_from_host_and_header() {
    let dir = TempDir::new().unwrap();
    let out = tc_core(&dir)
        .args(["identify", "--host", "acme.example.com:8080"])
        .assert()
        .success();
    let json = stdout_json(&out.get_output().stdout);
    assert_eq!(json["tenantId"], "acme");
    assert_eq!(json["fallback"], false);

    tc_core(&dir)
        .args(["--format", "text", "identify", "--host", "localhost"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default (fallback)"));

    let out = tc_core(&dir)
        .args(["identify", "--host", "acme.example.com", "--tenant-header", "beta"])
        .assert()
        .success();
    assert_eq!(stdout_json(&out.get_output().stdout)["tenantId"], "beta");
}

#[test]
fn check_reports_explicit_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("engine.json"),
        r#"{"cache":{"ttlSeconds":42}}"#,
    )
    .unwrap();
    let out = tc_core(&dir).arg("check").assert().success();
    let json = stdout_json(&out.get_output().stdout);
    assert_eq!(json["config"]["source"], "CLI argument");
    assert_eq!(json["config"]["settings"]["cache"]["ttlSeconds"], 42);
    assert_eq!(json["config"]["hash"].as_str().unwrap().len(), 64);
}

#[test]
fn check_rejects_invalid_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("engine.json"),
        r#"{"cache":{"enabled":true,"ttlSeconds":0}}"#,
    )
    .unwrap();
    tc_core(&dir)
        .arg("check")
        .assert()
        .code(ExitCode::ConfigError.as_i32());
}

#[test]
fn missing_explicit_config_is_not_found() {
    let mut cmd = cargo_bin_cmd!("tc-core");
    cmd.args(["-q", "--config", "/definitely/not/here/engine.json", "check"])
        .assert()
        .code(ExitCode::NotFound.as_i32());
}

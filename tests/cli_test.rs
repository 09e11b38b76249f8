//! Integration tests for the rubyrig binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let rig_dir = temp.path().join(".rubyrig");
    fs::create_dir_all(&rig_dir).unwrap();
    fs::write(rig_dir.join("config.yml"), config).unwrap();
    temp
}

fn rubyrig() -> Command {
    let mut cmd = Command::new(cargo_bin("rubyrig"));
    cmd.env_remove("RUBYRIG_PLATFORM").env("NO_COLOR", "1");
    cmd
}

const STUB_CONFIG: &str = r#"
settings:
  platform: "debian:8"
runtimes:
  default:
    provider: stub
    bundler_version: false
    options:
      ruby_binary: /opt/ruby/bin/ruby
      ruby_environment:
        GEM_HOME: /opt/gems
steps:
  - action: install_runtime
    runtime: default
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    rubyrig()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ruby runtime"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    rubyrig()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn run_without_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    rubyrig()
        .current_dir(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration not found"));
    Ok(())
}

#[test]
fn run_with_stub_runtime_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(STUB_CONFIG);
    rubyrig()
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("install runtime default (unchanged)"));
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("runtimes:\n  default:\n    provider: rvm\n");
    rubyrig()
        .current_dir(temp.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider 'rvm'"));
    Ok(())
}

#[test]
fn candidates_for_centos() -> Result<(), Box<dyn std::error::Error>> {
    rubyrig()
        .args(["candidates", "2.3", "--platform", "centos:7.4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rh-ruby23"))
        .stdout(predicate::str::contains("provider: scl"));
    Ok(())
}

#[test]
fn detect_honours_platform_override() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    rubyrig()
        .current_dir(temp.path())
        .env("RUBYRIG_PLATFORM", "ubuntu:14.04")
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::contains("family: ubuntu"))
        .stdout(predicate::str::contains("version: 14.04"))
        .stdout(predicate::str::contains("provider: system"));
    Ok(())
}

#[test]
fn plan_json_composes_stub_runtime() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(STUB_CONFIG);
    let output = rubyrig()
        .current_dir(temp.path())
        .args([
            "plan", "--json", "--runtime", "default", "-u", "deploy", "-e", "RACK_ENV=test", "--",
            "myapp.rb", "--port", "80",
        ])
        .output()?;
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(
        plan["command"],
        serde_json::json!(["/opt/ruby/bin/ruby", "myapp.rb", "--port", "80"])
    );
    assert_eq!(plan["environment"]["GEM_HOME"], "/opt/gems");
    assert_eq!(plan["environment"]["RACK_ENV"], "test");
    assert_eq!(plan["user"], "deploy");
    Ok(())
}

#[test]
fn plan_default_user_never_switches_unprivileged() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(STUB_CONFIG);
    let output = rubyrig()
        .current_dir(temp.path())
        .args(["plan", "--json", "--runtime", "default", "--", "-v"])
        .output()?;
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(
        plan["user"].is_null() || plan["user"] == "root",
        "unexpected user {}",
        plan["user"]
    );
    Ok(())
}

#[test]
fn plan_unknown_bundle_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(STUB_CONFIG);
    rubyrig()
        .current_dir(temp.path())
        .args(["plan", "--bundle", "missing", "--", "rake"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown bundle: missing"));
    Ok(())
}

#[test]
fn completions_generate() -> Result<(), Box<dyn std::error::Error>> {
    rubyrig()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rubyrig"));
    Ok(())
}

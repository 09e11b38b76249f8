//! Integration tests for config module public API.

use rubyrig::config::{
    load_merged_config, validate, validate_config, OutputMode, RigConfig, StepAction,
};
use std::fs;
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let rig_dir = temp.path().join(".rubyrig");
    fs::create_dir_all(&rig_dir).unwrap();
    for (name, content) in files {
        fs::write(rig_dir.join(name), content).unwrap();
    }
    temp
}

#[test]
fn public_api_is_accessible() {
    let config = RigConfig::default();
    assert!(validate_config(&config).is_empty());
    let _mode = OutputMode::Verbose;
}

#[test]
fn full_config_workflow() {
    let temp = project(&[(
        "config.yml",
        r#"
runtimes:
  default:
    version: "2.3"
bundles:
  app:
    path: /srv/app
    runtime: default
    vendor: true
    without: [development, test]
steps:
  - action: install_runtime
    runtime: default
  - action: bundle_install
    bundle: app
  - title: Migrate
    action: execute
    bundle: app
    command: [rake, "db:migrate"]
    environment:
      RAILS_ENV: production
"#,
    )]);

    let config = load_merged_config(temp.path()).unwrap();
    validate(&config).unwrap();

    assert!(config.bundles["app"].vendor.is_enabled());
    assert_eq!(config.bundles["app"].without, ["development", "test"]);
    match &config.steps[2].action {
        StepAction::Execute { environment, .. } => {
            assert_eq!(environment["RAILS_ENV"], "production")
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn config_merge_workflow() {
    let temp = project(&[
        (
            "config.yml",
            r#"
settings:
  default_output: verbose
runtimes:
  default:
    version: "2.2"
    provider: scl
"#,
        ),
        (
            "config.local.yml",
            r#"
settings:
  default_output: quiet
runtimes:
  default:
    version: "2.3"
"#,
        ),
    ]);

    let config = load_merged_config(temp.path()).unwrap();
    assert_eq!(config.settings.default_output, OutputMode::Quiet);
    let runtime = &config.runtimes["default"];
    assert_eq!(runtime.version, "2.3");
    assert_eq!(runtime.provider.as_deref(), Some("scl"));
}

#[test]
fn dangling_references_fail_validation() {
    let temp = project(&[(
        "config.yml",
        r#"
bundles:
  app:
    path: /srv/app
    runtime: missing
steps:
  - action: gem
    runtime: missing
    name: rake
"#,
    )]);

    let config = load_merged_config(temp.path()).unwrap();
    let errors = validate_config(&config);
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.rule == "unknown-runtime"));
    assert!(validate(&config).is_err());
}

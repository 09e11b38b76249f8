//! Deep merge for layered YAML configuration.
//!
//! `config.local.yml` is laid over `config.yml` before the result is
//! parsed.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Sequences are replaced entirely (the `steps` list is never spliced)
//! - Null values in the overlay delete the key from the base
//! - Scalars in the overlay replace the base

use serde_yaml::Value;

/// Deep merge `overlay` onto `base`.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge documents in order, later ones winning.
///
/// Empty documents (which parse as null) contribute nothing.
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .filter(|config| !config.is_null())
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn local_override_changes_one_runtime_field() {
        let base = yaml(
            r#"
runtimes:
  default:
    version: "2.1"
    options:
      dev_package: true
"#,
        );
        let overlay = yaml(
            r#"
runtimes:
  default:
    version: "2.3"
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["runtimes"]["default"]["version"], "2.3");
        assert_eq!(result["runtimes"]["default"]["options"]["dev_package"], true);
    }

    #[test]
    fn steps_are_replaced_not_merged() {
        let base = yaml(
            r#"
steps:
  - action: install_runtime
    runtime: default
  - action: bundle_install
    bundle: app
"#,
        );
        let overlay = yaml(
            r#"
steps:
  - action: install_runtime
    runtime: legacy
"#,
        );

        let result = deep_merge(&base, &overlay);
        let steps = result["steps"].as_sequence().unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0]["runtime"], "legacy");
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml(
            r#"
bundles:
  app:
    path: /srv/app
    user: deploy
"#,
        );
        let overlay = yaml(
            r#"
bundles:
  app:
    user: null
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert!(result["bundles"]["app"].get("user").is_none());
        assert_eq!(result["bundles"]["app"]["path"], "/srv/app");
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let base = yaml("options:\n  dev_package: true");
        let overlay = yaml("options: none");

        let result = deep_merge(&base, &overlay);
        assert_eq!(result["options"], "none");
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn empty_document_is_ignored() {
        let configs = vec![yaml("settings:\n  default_output: quiet"), yaml("")];

        let result = merge_configs(&configs);
        assert_eq!(result["settings"]["default_output"], "quiet");
    }

    #[test]
    fn merge_empty_configs_returns_empty() {
        let result = merge_configs(&[]);
        assert!(result.as_mapping().unwrap().is_empty());
    }
}

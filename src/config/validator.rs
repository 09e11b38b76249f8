//! Configuration validation rules.
//!
//! - Provider names must be registered
//! - Bundles must name a configured runtime
//! - Steps must reference configured runtimes and bundles
//! - `settings.platform` must parse as `family:version`

use crate::config::schema::RigConfig;
use crate::error::{RigError, Result};
use crate::platform::PlatformIdentity;
use crate::runtime::ProviderKind;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step index if error is step-specific
    pub step: Option<usize>,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: None,
        }
    }

    fn at_step(mut self, index: usize) -> Self {
        self.step = Some(index);
        self
    }
}

/// Validate a configuration and return all errors.
///
/// Every rule runs, so several problems can be fixed in one pass.
pub fn validate_config(config: &RigConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_settings(config));
    errors.extend(validate_runtimes(config));
    errors.extend(validate_bundles(config));
    errors.extend(validate_steps(config));

    errors
}

fn validate_settings(config: &RigConfig) -> Vec<ValidationError> {
    config
        .settings
        .platform
        .iter()
        .filter_map(|p| p.parse::<PlatformIdentity>().err().map(|e| (p, e)))
        .map(|(p, e)| {
            ValidationError::new(
                "invalid-platform",
                format!("settings.platform '{}' is invalid: {}", p, e),
            )
        })
        .collect()
}

fn validate_runtimes(config: &RigConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, runtime) in &config.runtimes {
        if let Some(provider) = &runtime.provider {
            if provider.parse::<ProviderKind>().is_err() {
                errors.push(ValidationError::new(
                    "unknown-provider",
                    format!(
                        "Runtime '{}' uses unknown provider '{}' (expected one of: {})",
                        name,
                        provider,
                        ProviderKind::ALL
                            .iter()
                            .map(ProviderKind::as_str)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ));
            }
        }
    }

    errors
}

fn validate_bundles(config: &RigConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (name, bundle) in &config.bundles {
        if bundle.runtime.is_empty() {
            errors.push(ValidationError::new(
                "missing-runtime",
                format!("Bundle '{}' must name a runtime", name),
            ));
        } else if !config.runtimes.contains_key(&bundle.runtime) {
            errors.push(ValidationError::new(
                "unknown-runtime",
                format!(
                    "Bundle '{}' uses runtime '{}' which does not exist",
                    name, bundle.runtime
                ),
            ));
        }
    }

    errors
}

fn validate_steps(config: &RigConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (index, step) in config.steps.iter().enumerate() {
        let title = step.display_title();

        if let Some(runtime) = step.action.runtime() {
            if !config.runtimes.contains_key(runtime) {
                errors.push(
                    ValidationError::new(
                        "unknown-runtime",
                        format!(
                            "Step {} ({}) references runtime '{}' which does not exist",
                            index + 1,
                            title,
                            runtime
                        ),
                    )
                    .at_step(index),
                );
            }
        }

        if let Some(bundle) = step.action.bundle() {
            if !config.bundles.contains_key(bundle) {
                errors.push(
                    ValidationError::new(
                        "unknown-bundle",
                        format!(
                            "Step {} ({}) references bundle '{}' which does not exist",
                            index + 1,
                            title,
                            bundle
                        ),
                    )
                    .at_step(index),
                );
            }
        }
    }

    errors
}

/// Validate and return the first error as [`RigError::ConfigValidationError`].
pub fn validate(config: &RigConfig) -> Result<()> {
    match validate_config(config).into_iter().next() {
        Some(error) => Err(RigError::ConfigValidationError {
            message: error.message,
        }),
        None => Ok(()),
    }
}

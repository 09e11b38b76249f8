//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use rubyrig::config::{load_merged_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".rubyrig");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "runtimes:\n  default:\n    version: \"2.3\"\n").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.runtimes["default"].version, "2.3");
//! ```
//!
//! # Configuration File Locations
//!
//! 1. Project config (`.rubyrig/config.yml`)
//! 2. Local overrides (`.rubyrig/config.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{
    BundleConfig, OutputMode, ProviderOptions, RigConfig, RuntimeConfig, Settings, StepAction,
    StepConfig, Toggle,
};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_DIR,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};

//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::RigConfig;
use crate::error::{Result, RigError};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the project configuration.
pub const CONFIG_DIR: &str = ".rubyrig";

/// Paths to configuration files, in merge order.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project config: .rubyrig/config.yml
    pub project: Option<PathBuf>,

    /// Local overrides: .rubyrig/config.local.yml
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            project: existing(project_root.join(CONFIG_DIR).join("config.yml")),
            project_local: existing(project_root.join(CONFIG_DIR).join("config.local.yml")),
        }
    }

    /// Path the project config is expected at.
    pub fn expected(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join("config.yml")
    }

    /// All existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(self.project_local.iter()).collect()
    }

    /// Check if any project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the project root by walking up from `start` to the first directory
/// containing `.rubyrig`. Falls back to `start`.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RigError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RigError::Io(e)
        }
    })
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<RigConfig> {
    parse_config(&read(path)?, path)
}

/// Parse YAML content; `source_path` is used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<RigConfig> {
    if content.trim().is_empty() {
        return Ok(RigConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| RigError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as a raw YAML value, for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    serde_yaml::from_str(&read(path)?).map_err(|e| RigError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load `config.yml` with `config.local.yml` merged on top.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists.
pub fn load_merged_config(project_root: &Path) -> Result<RigConfig> {
    let paths = ConfigPaths::discover(project_root);

    if !paths.has_project_config() {
        return Err(RigError::ConfigNotFound {
            path: ConfigPaths::expected(project_root),
        });
    }

    let configs = paths
        .all_existing()
        .into_iter()
        .map(|p| load_config_value(p))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Merging {} config file(s)", configs.len());
    serde_yaml::from_value(merge_configs(&configs)).map_err(|e| RigError::ConfigParseError {
        path: ConfigPaths::expected(project_root),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with optional path override.
///
/// An override is loaded on its own, without merging.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<RigConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(project_root),
    }
}

//! Configuration schema definitions for rubyrig.
//!
//! This module contains all the struct definitions that map to
//! the YAML configuration file format.

use crate::command::CommandSpec;
use crate::ports::PackageAction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Root configuration structure for `.rubyrig/config.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Global settings
    pub settings: Settings,

    /// Runtime definitions, by name
    #[serde(default)]
    pub runtimes: BTreeMap<String, RuntimeConfig>,

    /// Bundle definitions, by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bundles: BTreeMap<String, BundleConfig>,

    /// Ordered provisioning steps
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// Global settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default output mode: verbose, normal, quiet, silent
    pub default_output: OutputMode,

    /// Platform override as `family:version`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Environment added to every `execute` step
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Verbose,
    #[default]
    Normal,
    Quiet,
    Silent,
}

/// A boolean switch that may carry a string value instead.
///
/// `dev_package: true` enables the default package name,
/// `dev_package: ruby-dev-custom` enables it with a literal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Flag(bool),
    Value(String),
}

impl Default for Toggle {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl Toggle {
    /// Shorthand for `Toggle::Flag(true)`.
    pub fn on() -> Self {
        Self::Flag(true)
    }

    /// Whether the switch is set (a non-empty string counts).
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Value(s) => !s.is_empty(),
        }
    }

    /// The string value, if one was given.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Toggle {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<&str> for Toggle {
    fn from(s: &str) -> Self {
        Self::Value(s.to_string())
    }
}

fn is_off(t: &Toggle) -> bool {
    !t.is_enabled()
}

fn is_on(t: &Toggle) -> bool {
    *t == Toggle::on()
}

fn is_false(v: &bool) -> bool {
    !v
}

/// A named Ruby runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Version request: "", "2", "2.1", "2.1.5"
    #[serde(default)]
    pub version: String,

    /// Provider name; auto-detected when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Bundler to install: true = latest, false = none, string = pinned
    #[serde(default = "Toggle::on", skip_serializing_if = "is_on")]
    pub bundler_version: Toggle,

    /// Provider-specific options
    #[serde(default)]
    pub options: ProviderOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            version: String::new(),
            provider: None,
            bundler_version: Toggle::on(),
            options: ProviderOptions::default(),
        }
    }
}

/// Options interpreted by the runtime providers.
///
/// Each provider reads the subset it understands and ignores the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    /// Install the development headers package (system)
    #[serde(skip_serializing_if = "is_on")]
    pub dev_package: Toggle,

    /// Install the rubygems package; platform default when absent (system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubygems_package: Option<Toggle>,

    /// Package name, bypassing candidate selection (system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,

    /// Package version pin, bypassing the candidate query (system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_version: Option<String>,

    /// Upgrade instead of install (system)
    #[serde(skip_serializing_if = "is_false")]
    pub package_upgrade: bool,

    /// Interpreter path (preinstalled, stub)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruby_binary: Option<PathBuf>,

    /// Gem binary path (stub)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gem_binary: Option<PathBuf>,

    /// Runtime environment (stub)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ruby_environment: BTreeMap<String, String>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            dev_package: Toggle::on(),
            rubygems_package: None,
            package_name: None,
            package_version: None,
            package_upgrade: false,
            ruby_binary: None,
            gem_binary: None,
            ruby_environment: BTreeMap::new(),
        }
    }
}

/// A named bundle: a Gemfile installed against a runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Gemfile, or a directory at or below the one holding it
    pub path: PathBuf,

    /// Runtime the bundle is installed with
    pub runtime: String,

    /// Generate binstubs (true = `bin`, string = directory)
    #[serde(skip_serializing_if = "is_off")]
    pub binstubs: Toggle,

    /// Vendor gems (true = `vendor/bundle`, string = directory)
    #[serde(skip_serializing_if = "is_off")]
    pub vendor: Toggle,

    /// Deployment mode
    #[serde(skip_serializing_if = "is_false")]
    pub deployment: bool,

    /// Parallel install jobs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<u32>,

    /// Network retries handed to bundler
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<u32>,

    /// Groups to skip
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub without: Vec<String>,

    /// User to run bundler as
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Gem binary override; the runtime's when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gem_binary: Option<PathBuf>,
}

/// One provisioning step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Title (for display)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// What the step does
    #[serde(flatten)]
    pub action: StepAction,
}

impl StepConfig {
    /// Display title, falling back to a summary of the action.
    pub fn display_title(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.action.summary())
    }
}

/// The action a step performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    /// Install a runtime (and bundler).
    InstallRuntime { runtime: String },

    /// Remove a runtime.
    UninstallRuntime { runtime: String },

    /// Manage a gem through a runtime.
    Gem {
        runtime: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(default)]
        state: PackageAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<String>,
    },

    /// `bundle install` for a bundle.
    BundleInstall { bundle: String },

    /// `bundle update` for a bundle.
    BundleUpdate { bundle: String },

    /// Run a command under a runtime, optionally inside a bundle.
    Execute {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        runtime: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bundle: Option<String>,
        command: CommandSpec,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        environment: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        directory: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user: Option<String>,
    },
}

impl StepAction {
    /// Short description, e.g. `install runtime default`.
    pub fn summary(&self) -> String {
        match self {
            Self::InstallRuntime { runtime } => format!("install runtime {}", runtime),
            Self::UninstallRuntime { runtime } => format!("uninstall runtime {}", runtime),
            Self::Gem { name, state, .. } => format!("{} gem {}", state, name),
            Self::BundleInstall { bundle } => format!("bundle install {}", bundle),
            Self::BundleUpdate { bundle } => format!("bundle update {}", bundle),
            Self::Execute { command, .. } => format!("execute {}", command),
        }
    }

    /// Runtime the step names directly, if any.
    pub fn runtime(&self) -> Option<&str> {
        match self {
            Self::InstallRuntime { runtime }
            | Self::UninstallRuntime { runtime }
            | Self::Gem { runtime, .. } => Some(runtime),
            Self::Execute { runtime, .. } => runtime.as_deref(),
            Self::BundleInstall { .. } | Self::BundleUpdate { .. } => None,
        }
    }

    /// Bundle the step names, if any.
    pub fn bundle(&self) -> Option<&str> {
        match self {
            Self::BundleInstall { bundle } | Self::BundleUpdate { bundle } => Some(bundle),
            Self::Execute { bundle, .. } => bundle.as_deref(),
            _ => None,
        }
    }
}

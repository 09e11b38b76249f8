//! Provider with fixed answers and no side effects.

use crate::config::ProviderOptions;
use crate::error::Result;
use crate::ports::Host;
use crate::runtime::providers::RuntimeProvider;
use crate::runtime::record::derive_gem_binary;
use crate::runtime::selector::ProviderKind;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Interpreter path used when none is configured.
pub const STUB_RUBY: &str = "/ruby";

/// Returns configured paths and counts install/uninstall calls.
#[derive(Debug, Default)]
pub struct Stub {
    ruby_binary: Option<PathBuf>,
    gem_binary: Option<PathBuf>,
    environment: BTreeMap<String, String>,
    installs: Cell<usize>,
    uninstalls: Cell<usize>,
}

impl Stub {
    /// A stub answering `/ruby` and `/gem`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub answering with the `ruby_binary`, `gem_binary` and
    /// `ruby_environment` options.
    pub fn from_options(options: &ProviderOptions) -> Self {
        Self {
            ruby_binary: options.ruby_binary.clone(),
            gem_binary: options.gem_binary.clone(),
            environment: options.ruby_environment.clone(),
            ..Self::default()
        }
    }

    /// Set the interpreter path.
    pub fn with_ruby_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.ruby_binary = Some(path.into());
        self
    }

    /// Set the gem binary path.
    pub fn with_gem_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.gem_binary = Some(path.into());
        self
    }

    /// Set one environment variable.
    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of install calls so far.
    pub fn installs(&self) -> usize {
        self.installs.get()
    }

    /// Number of uninstall calls so far.
    pub fn uninstalls(&self) -> usize {
        self.uninstalls.get()
    }
}

impl RuntimeProvider for Stub {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Stub
    }

    fn install(&self, _host: &Host<'_>) -> Result<bool> {
        self.installs.set(self.installs.get() + 1);
        Ok(false)
    }

    fn uninstall(&self, _host: &Host<'_>) -> Result<bool> {
        self.uninstalls.set(self.uninstalls.get() + 1);
        Ok(false)
    }

    fn ruby_binary(&self, _host: &Host<'_>) -> Result<PathBuf> {
        Ok(self
            .ruby_binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(STUB_RUBY)))
    }

    fn gem_binary(&self, host: &Host<'_>) -> Result<PathBuf> {
        match &self.gem_binary {
            Some(gem) => Ok(gem.clone()),
            None => derive_gem_binary(&self.ruby_binary(host)?),
        }
    }

    fn ruby_environment(&self, _host: &Host<'_>) -> Result<BTreeMap<String, String>> {
        Ok(self.environment.clone())
    }
}

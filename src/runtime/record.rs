//! Resolved runtime paths and environment.

use crate::config::Toggle;
use crate::error::{RigError, Result};
use crate::version::matcher::RUNTIME_NAME;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name prefix of the package manager binary.
pub const COMPANION_NAME: &str = "gem";

/// Everything needed to run commands under one runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeRecord {
    /// Path to the interpreter.
    pub ruby_binary: PathBuf,
    /// Path to the gem binary.
    pub gem_binary: PathBuf,
    /// Variables the interpreter needs.
    pub environment: BTreeMap<String, String>,
    /// Bundler version to bootstrap.
    pub bundler_version: Toggle,
}

/// Derive the gem binary next to a Ruby binary.
///
/// `/usr/bin/ruby2.0` becomes `/usr/bin/gem2.0`. The basename must start
/// with `ruby`.
pub fn derive_gem_binary(ruby_binary: &Path) -> Result<PathBuf> {
    let unsupported = || RigError::UnsupportedBinaryName {
        binary: ruby_binary.to_path_buf(),
    };
    let base = ruby_binary
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(unsupported)?;
    let suffix = base.strip_prefix(RUNTIME_NAME).ok_or_else(unsupported)?;
    let gem = format!("{}{}", COMPANION_NAME, suffix);
    Ok(match ruby_binary.parent() {
        Some(dir) => dir.join(gem),
        None => PathBuf::from(gem),
    })
}

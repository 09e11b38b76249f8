//! Resolved bundle: Gemfile location and bundler binary.

use crate::command::{CommandSpec, ExecutionPlan};
use crate::config::Toggle;
use crate::error::{RigError, Result};
use crate::ports::exec::{run_checked, Executor};
use crate::ports::{expand_path, Filesystem};
use crate::runtime::RuntimeRecord;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Manifest file name.
pub const GEMFILE: &str = "Gemfile";

/// Variable pointing bundler at the manifest.
pub const BUNDLE_GEMFILE_ENV: &str = "BUNDLE_GEMFILE";

static EXECUTABLE_DIRECTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)EXECUTABLE DIRECTORY: (.*)$").expect("valid regex")
});

/// Everything command composition needs to know about a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleContext {
    /// Absolute path to the Gemfile.
    pub gemfile: PathBuf,
    /// Path to the `bundle` executable.
    pub bundler_binary: PathBuf,
    pub binstubs: Toggle,
    pub vendor: Toggle,
    pub deployment: bool,
}

impl BundleContext {
    /// Directory holding the Gemfile.
    pub fn root(&self) -> &Path {
        self.gemfile.parent().unwrap_or_else(|| Path::new("/"))
    }
}

/// Locate the Gemfile for `start`.
///
/// A path naming a file is used as is. Otherwise each directory from
/// `start` up to `/` is checked for a `Gemfile`. Relative paths are
/// expanded against `cwd`.
pub fn find_gemfile(fs: &dyn Filesystem, start: &Path, cwd: &Path) -> Result<PathBuf> {
    let start = expand_path(start, cwd);
    if fs.is_file(&start) {
        return Ok(start);
    }
    start
        .ancestors()
        .map(|dir| dir.join(GEMFILE))
        .find(|candidate| fs.is_file(candidate))
        .ok_or(RigError::ManifestNotFound { start })
}

/// Pull the executable directory out of `gem environment` output.
pub fn parse_gem_bindir(output: &str) -> Option<PathBuf> {
    EXECUTABLE_DIRECTORY
        .captures(output)
        .map(|c| PathBuf::from(c[1].trim()))
}

/// Find `bundle` in the runtime's global executable directory.
pub fn discover_bundler_binary(
    exec: &dyn Executor,
    record: &RuntimeRecord,
    gem_binary: &Path,
) -> Result<PathBuf> {
    let plan = ExecutionPlan::new(CommandSpec::argv([
        record.ruby_binary.display().to_string(),
        gem_binary.display().to_string(),
        "environment".to_string(),
    ]))
    .with_environment(record.environment.clone());
    let output = run_checked(exec, &plan)?;
    let bindir = parse_gem_bindir(&output.stdout).ok_or(RigError::GemBindirNotFound {
        output: output.stdout,
    })?;
    Ok(bindir.join("bundle"))
}

//! Error types for rubyrig operations.
//!
//! This module defines [`RigError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Resolution and composition failures are terminal for the enclosing
//!   provisioning step; nothing here is retried internally
//! - Each variant carries the state an operator needs to fix the declared
//!   request (candidates tried, versions seen, paths scanned)
//! - Use `anyhow::Error` (via `RigError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// A package that was considered during native resolution and rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedCandidate {
    /// Package name that was queried.
    pub name: String,
    /// Version the package manager would install, if any.
    pub version: Option<String>,
}

impl std::fmt::Display for RejectedCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} ({})", self.name, v),
            None => write!(f, "{} (not available)", self.name),
        }
    }
}

fn format_rejected(rejected: &[RejectedCandidate]) -> String {
    if rejected.is_empty() {
        return "none".to_string();
    }
    rejected
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_names(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

/// Core error type for rubyrig operations.
#[derive(Debug, Error)]
pub enum RigError {
    /// No native package satisfies the requested Ruby version.
    #[error(
        "Unable to find a candidate package for Ruby version {version:?} (tried: {}; proposed: {}; known on this platform: {}). Set the package_name or package_version provider options.",
        format_rejected(.rejected),
        format_names(.proposed),
        format_names(.known)
    )]
    NoCandidatePackage {
        version: String,
        rejected: Vec<RejectedCandidate>,
        /// Names derived from the version request.
        proposed: Vec<String>,
        /// Packages the platform table knows.
        known: Vec<String>,
    },

    /// No software collection matches the requested version on this platform.
    #[error("No software collection matches Ruby version {version:?} on {platform} (known: {known})")]
    NoMatchingCollection {
        version: String,
        platform: String,
        known: String,
    },

    /// No registered provider claims this platform automatically.
    #[error("No Ruby provider is available automatically for {platform}; set `provider` explicitly")]
    NoAutoProvider { platform: String },

    /// Vendored bundle has neither an ABI folder nor a `bin` folder.
    #[error("Unable to find the vendor bin folder for {}: {}", .path.display(), .entries.join(", "))]
    VendorBinDirNotFound { path: PathBuf, entries: Vec<String> },

    /// No Gemfile was found walking up from the given path.
    #[error("No Gemfile found at or above {}", .start.display())]
    ManifestNotFound { start: PathBuf },

    /// The requested command could not be resolved against PATH.
    #[error("Command '{command}' not found on PATH ({path})")]
    CommandNotFound { command: String, path: String },

    /// A Ruby binary whose name does not allow deriving its gem binary.
    #[error("Cannot derive gem binary from {}: basename must start with 'ruby'", .binary.display())]
    UnsupportedBinaryName { binary: PathBuf },

    /// Attempt to uninstall a Ruby this tool does not own.
    #[error("Cannot uninstall the preinstalled Ruby at {}", .binary.display())]
    CannotUninstallManagedRuntime { binary: PathBuf },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {}: {message}", .path.display())]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Reference to a runtime that is not configured.
    #[error("Unknown runtime: {name}")]
    UnknownRuntime { name: String },

    /// Reference to a bundle that is not configured.
    #[error("Unknown bundle: {name}")]
    UnknownBundle { name: String },

    /// Provider name that is not registered.
    #[error("Unknown provider '{name}' (expected one of: system, scl, preinstalled, stub)")]
    UnknownProvider { name: String },

    /// External command failed.
    #[error("Command failed with exit code {code:?}: {command}\n{stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// `gem environment` output lacked the executable directory line.
    #[error("Cannot find EXECUTABLE DIRECTORY in gem environment output:\n{output}")]
    GemBindirNotFound { output: String },

    /// Package manager query failed in an unexpected way.
    #[error("Package query for '{package}' failed: {message}")]
    PackageQueryFailed { package: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for rubyrig operations.
pub type Result<T> = std::result::Result<T, RigError>;

//! rubyrig - Ruby runtime and bundle provisioning.
//!
//! rubyrig installs a Ruby interpreter from the best source a Linux host
//! offers (distribution packages, Software Collections, or an existing
//! binary), bootstraps bundler, installs Gemfile bundles, and runs
//! commands under the resulting runtime.
//!
//! # Modules
//!
//! - [`bundle`] - Gemfile discovery, bundler invocation, and bundle paths
//! - [`cli`] - Command-line interface and argument parsing
//! - [`command`] - Command specs, execution plans, and composition
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`gems`] - Single-gem management through a runtime
//! - [`platform`] - Host platform identity and detection
//! - [`ports`] - Package manager, process, filesystem, and collection seams
//! - [`runner`] - Provisioning runs over configured steps
//! - [`runtime`] - Runtime providers and provider selection
//! - [`shell`] - Process execution and local accounts
//! - [`ui`] - Terminal output
//! - [`version`] - Version requests and package-name candidates
//!
//! # Example
//!
//! ```
//! use rubyrig::version::{candidate_names, matches};
//!
//! assert_eq!(candidate_names("2.1"), vec!["ruby2.1", "ruby"]);
//! assert!(matches("1:2.1.5-2+deb8u3", "2.1"));
//! assert!(!matches("2.2.0", "2.1"));
//! ```

pub mod bundle;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod gems;
pub mod platform;
pub mod ports;
pub mod runner;
pub mod runtime;
pub mod shell;
pub mod ui;
pub mod version;

pub use error::{Result, RigError};

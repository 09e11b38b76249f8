//! Ruby runtimes: providers, selection and resolved records.
//!
//! This module provides:
//! - [`RuntimeProvider`] and its four implementations
//! - [`ProviderSelector`] for explicit or auto-detected provider choice
//! - [`RuntimeRecord`], the paths and environment of a resolved runtime
//! - [`RubyRuntime`], which memoises the record and bootstraps bundler

pub mod entity;
pub mod providers;
pub mod record;
pub mod selector;

pub use entity::{InstallOutcome, RubyRuntime, BUNDLER_GEM};
pub use providers::RuntimeProvider;
pub use record::{derive_gem_binary, RuntimeRecord};
pub use selector::{ProviderKind, ProviderSelector, DEFAULT_PRIORITY};

//! Runtime providers.
//!
//! Each provider turns a version request into concrete binary paths and
//! knows how to install and remove the runtime:
//!
//! - [`native::NativePackage`] - distribution packages via apt or yum
//! - [`collection::SoftwareCollection`] - Software Collections under `/opt/rh`
//! - [`preinstalled::Preinstalled`] - a Ruby already on the host
//! - [`stub::Stub`] - fixed answers, no side effects

pub mod collection;
pub mod native;
pub mod preinstalled;
pub mod stub;

pub use collection::SoftwareCollection;
pub use native::NativePackage;
pub use preinstalled::Preinstalled;
pub use stub::Stub;

use crate::error::Result;
use crate::ports::Host;
use crate::runtime::record::derive_gem_binary;
use crate::runtime::selector::ProviderKind;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A way of obtaining a Ruby runtime.
///
/// Providers are built for one version request and may memoise their
/// resolution; every method may be called repeatedly.
pub trait RuntimeProvider {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Install the runtime, returning whether anything changed.
    fn install(&self, host: &Host<'_>) -> Result<bool>;

    /// Remove the runtime, returning whether anything changed.
    fn uninstall(&self, host: &Host<'_>) -> Result<bool>;

    /// Path to the Ruby interpreter.
    fn ruby_binary(&self, host: &Host<'_>) -> Result<PathBuf>;

    /// Path to the gem binary; derived from the interpreter by default.
    fn gem_binary(&self, host: &Host<'_>) -> Result<PathBuf> {
        derive_gem_binary(&self.ruby_binary(host)?)
    }

    /// Extra environment the interpreter needs.
    fn ruby_environment(&self, _host: &Host<'_>) -> Result<BTreeMap<String, String>> {
        Ok(BTreeMap::new())
    }
}

//! A Ruby that is already on the host and not managed here.

use crate::command::lookup::find_executable;
use crate::error::{RigError, Result};
use crate::ports::Host;
use crate::runtime::providers::RuntimeProvider;
use crate::runtime::selector::ProviderKind;
use crate::version::matcher::RUNTIME_NAME;
use std::path::PathBuf;

/// Uses an existing interpreter; never installs or removes anything.
#[derive(Debug, Clone)]
pub struct Preinstalled {
    ruby_binary: Option<PathBuf>,
    search_path: String,
}

impl Preinstalled {
    /// Use `ruby_binary`, or the first `ruby` on the process `PATH`.
    pub fn new(ruby_binary: Option<PathBuf>) -> Self {
        Self::with_search_path(ruby_binary, std::env::var("PATH").unwrap_or_default())
    }

    /// Like [`Preinstalled::new`] with an explicit search path.
    pub fn with_search_path(ruby_binary: Option<PathBuf>, search_path: impl Into<String>) -> Self {
        Self {
            ruby_binary,
            search_path: search_path.into(),
        }
    }
}

impl RuntimeProvider for Preinstalled {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Preinstalled
    }

    fn install(&self, host: &Host<'_>) -> Result<bool> {
        let binary = self.ruby_binary(host)?;
        tracing::debug!("Using preinstalled Ruby at {}", binary.display());
        Ok(false)
    }

    fn uninstall(&self, host: &Host<'_>) -> Result<bool> {
        // Refused whether or not the interpreter can be found.
        let binary = self
            .ruby_binary(host)
            .unwrap_or_else(|_| PathBuf::from(RUNTIME_NAME));
        Err(RigError::CannotUninstallManagedRuntime { binary })
    }

    fn ruby_binary(&self, host: &Host<'_>) -> Result<PathBuf> {
        if let Some(binary) = &self.ruby_binary {
            return Ok(binary.clone());
        }
        find_executable(host.fs, RUNTIME_NAME, &self.search_path).ok_or_else(|| {
            RigError::CommandNotFound {
                command: RUNTIME_NAME.to_string(),
                path: self.search_path.clone(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformFamily, PlatformIdentity};
    use crate::ports::fake::{FakeFilesystem, FakeHost};

    fn fake() -> FakeHost {
        FakeHost::new(PlatformIdentity::new(PlatformFamily::Other, "")).with_fs(
            FakeFilesystem::new().with_executable("/usr/local/bin/ruby"),
        )
    }

    #[test]
    fn finds_ruby_on_search_path() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(None, "/usr/bin:/usr/local/bin");
        assert_eq!(
            provider.ruby_binary(&fake.host()).unwrap(),
            PathBuf::from("/usr/local/bin/ruby")
        );
        assert_eq!(
            provider.gem_binary(&fake.host()).unwrap(),
            PathBuf::from("/usr/local/bin/gem")
        );
    }

    #[test]
    fn explicit_binary_wins() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(
            Some(PathBuf::from("/opt/chef/embedded/bin/ruby")),
            "/usr/local/bin",
        );
        assert_eq!(
            provider.ruby_binary(&fake.host()).unwrap(),
            PathBuf::from("/opt/chef/embedded/bin/ruby")
        );
    }

    #[test]
    fn install_is_a_no_op() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(None, "/usr/local/bin");
        assert!(!provider.install(&fake.host()).unwrap());
        assert!(fake.packages.applied().is_empty());
    }

    #[test]
    fn uninstall_is_refused() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(None, "/usr/local/bin");
        let err = provider.uninstall(&fake.host()).unwrap_err();
        assert!(matches!(err, RigError::CannotUninstallManagedRuntime { .. }));
        assert!(err.to_string().contains("/usr/local/bin/ruby"));
    }

    #[test]
    fn uninstall_is_refused_without_ruby_on_path() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(None, "/nowhere");
        let err = provider.uninstall(&fake.host()).unwrap_err();
        assert!(matches!(
            err,
            RigError::CannotUninstallManagedRuntime { ref binary } if binary == &PathBuf::from("ruby")
        ));
    }

    #[test]
    fn missing_ruby_is_reported() {
        let fake = fake();
        let provider = Preinstalled::with_search_path(None, "/usr/bin");
        assert!(matches!(
            provider.ruby_binary(&fake.host()),
            Err(RigError::CommandNotFound { .. })
        ));
    }
}

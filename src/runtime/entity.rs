//! A configured Ruby runtime.

use crate::config::{RuntimeConfig, Toggle};
use crate::error::Result;
use crate::gems::GemPackage;
use crate::platform::PlatformIdentity;
use crate::ports::Host;
use crate::runtime::providers::RuntimeProvider;
use crate::runtime::record::RuntimeRecord;
use crate::runtime::selector::{ProviderKind, ProviderSelector};
use std::cell::OnceCell;

/// Name of the gem providing `bundle`.
pub const BUNDLER_GEM: &str = "bundler";

/// Result of [`RubyRuntime::resolve_and_install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub record: RuntimeRecord,
    pub changed: bool,
}

/// A named runtime: a provider, a version request and the bundler to
/// bootstrap. Its [`RuntimeRecord`] is computed on first use and reused.
pub struct RubyRuntime {
    name: String,
    version: String,
    bundler_version: Toggle,
    provider: Box<dyn RuntimeProvider>,
    record: OnceCell<RuntimeRecord>,
}

impl std::fmt::Debug for RubyRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RubyRuntime")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("provider", &self.provider.kind())
            .finish()
    }
}

impl RubyRuntime {
    /// Wrap a provider.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        bundler_version: Toggle,
        provider: Box<dyn RuntimeProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            bundler_version,
            provider,
            record: OnceCell::new(),
        }
    }

    /// Build from configuration, choosing the provider for the platform.
    pub fn from_config(
        name: &str,
        config: &RuntimeConfig,
        platform: &PlatformIdentity,
        selector: &ProviderSelector,
    ) -> Result<Self> {
        let provider = selector.provider_for(config, platform)?;
        tracing::debug!("Runtime {} uses provider {}", name, provider.kind());
        Ok(Self::new(
            name,
            config.version.clone(),
            config.bundler_version.clone(),
            provider,
        ))
    }

    /// Runtime name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version request.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Provider in use.
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Binary paths and environment, resolved once.
    pub fn record(&self, host: &Host<'_>) -> Result<&RuntimeRecord> {
        if let Some(record) = self.record.get() {
            return Ok(record);
        }
        let record = RuntimeRecord {
            ruby_binary: self.provider.ruby_binary(host)?,
            gem_binary: self.provider.gem_binary(host)?,
            environment: self.provider.ruby_environment(host)?,
            bundler_version: self.bundler_version.clone(),
        };
        tracing::debug!(
            "Runtime {} resolved to {}",
            self.name,
            record.ruby_binary.display()
        );
        Ok(self.record.get_or_init(|| record))
    }

    /// Install the runtime and bundler, returning whether anything changed.
    pub fn install(&self, host: &Host<'_>) -> Result<bool> {
        let mut changed = self.provider.install(host)?;
        if self.bundler_version.is_enabled() {
            let record = self.record(host)?;
            let bundler = GemPackage::new(BUNDLER_GEM)
                .with_version(self.bundler_version.value().map(str::to_string));
            changed |= bundler.apply(host.exec, record)?;
        }
        Ok(changed)
    }

    /// Install, then hand back the resolved record.
    pub fn resolve_and_install(&self, host: &Host<'_>) -> Result<InstallOutcome> {
        let changed = self.install(host)?;
        Ok(InstallOutcome {
            record: self.record(host)?.clone(),
            changed,
        })
    }

    /// Remove the runtime.
    pub fn uninstall(&self, host: &Host<'_>) -> Result<bool> {
        self.provider.uninstall(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderOptions;
    use crate::platform::PlatformFamily;
    use crate::ports::exec::ExecOutput;
    use crate::ports::fake::{FakeHost, FakePackages};
    use crate::runtime::providers::{NativePackage, Stub};
    use std::path::PathBuf;

    fn stub_runtime(bundler: Toggle) -> RubyRuntime {
        RubyRuntime::new(
            "default",
            "",
            bundler,
            Box::new(Stub::new().with_env("GEM_HOME", "/gems")),
        )
    }

    fn fake() -> FakeHost {
        FakeHost::new(PlatformIdentity::new(PlatformFamily::Ubuntu, "14.04"))
    }

    #[test]
    fn record_comes_from_provider() {
        let fake = fake();
        let runtime = stub_runtime(Toggle::on());
        let record = runtime.record(&fake.host()).unwrap();
        assert_eq!(record.ruby_binary, PathBuf::from("/ruby"));
        assert_eq!(record.gem_binary, PathBuf::from("/gem"));
        assert_eq!(record.environment["GEM_HOME"], "/gems");
        assert_eq!(runtime.provider_kind(), ProviderKind::Stub);
    }

    #[test]
    fn install_bootstraps_bundler() {
        let fake = fake();
        let runtime = stub_runtime(Toggle::from("1.17.3"));
        assert!(runtime.install(&fake.host()).unwrap());
        assert!(fake.exec.ran("/ruby /gem install bundler --version 1.17.3"));
    }

    #[test]
    fn bundler_can_be_skipped() {
        let fake = fake();
        let runtime = stub_runtime(Toggle::Flag(false));
        assert!(!runtime.install(&fake.host()).unwrap());
        assert!(fake.exec.plans().is_empty());
    }

    #[test]
    fn second_resolve_and_install_changes_nothing() {
        let fake = fake().with_packages(
            FakePackages::new().with_candidate("ruby2.0", "2.0.0.484-1ubuntu2"),
        );
        let options = ProviderOptions {
            dev_package: Toggle::Flag(false),
            ..ProviderOptions::default()
        };
        let runtime = RubyRuntime::new(
            "default",
            "2.0",
            Toggle::on(),
            Box::new(NativePackage::new("2.0", options)),
        );

        let first = runtime.resolve_and_install(&fake.host()).unwrap();
        assert!(first.changed);
        assert_eq!(first.record.ruby_binary, PathBuf::from("/usr/bin/ruby2.0"));

        fake.exec
            .respond("/usr/bin/ruby2.0 /usr/bin/gem2.0 list -i", ExecOutput::ok("true"));
        let second = runtime.resolve_and_install(&fake.host()).unwrap();
        assert!(!second.changed);
        assert_eq!(second.record, first.record);
        assert_eq!(fake.packages.applied().len(), 1);
        assert_eq!(fake.packages.queries(), vec!["ruby2.0"]);
    }

    #[test]
    fn uninstall_delegates_to_provider() {
        let fake = fake();
        let runtime = stub_runtime(Toggle::on());
        assert!(!runtime.uninstall(&fake.host()).unwrap());
    }
}

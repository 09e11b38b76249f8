//! `bundle install` and `bundle update`.

use crate::bundle::context::{
    discover_bundler_binary, find_gemfile, BundleContext, BUNDLE_GEMFILE_ENV,
};
use crate::bundle::path::DEFAULT_VENDOR_PATH;
use crate::command::{CommandSpec, ExecutionPlan};
use crate::config::BundleConfig;
use crate::error::Result;
use crate::ports::exec::run_checked;
use crate::ports::Host;
use crate::runtime::RuntimeRecord;
use std::cell::OnceCell;
use std::path::Path;

/// Marker bundler prints for each gem it actually installs.
const INSTALLING_MARKER: &str = "Installing";

/// A configured bundle. The [`BundleContext`] is resolved on first use.
#[derive(Debug)]
pub struct BundleInstall {
    name: String,
    config: BundleConfig,
    context: OnceCell<BundleContext>,
}

impl BundleInstall {
    pub fn new(name: impl Into<String>, config: BundleConfig) -> Self {
        Self {
            name: name.into(),
            config,
            context: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the runtime the bundle is installed with.
    pub fn runtime(&self) -> &str {
        &self.config.runtime
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Locate the Gemfile and bundler binary, once.
    ///
    /// Relative bundle paths are taken from `base`.
    pub fn context(
        &self,
        host: &Host<'_>,
        record: &RuntimeRecord,
        base: &Path,
    ) -> Result<&BundleContext> {
        if let Some(ctx) = self.context.get() {
            return Ok(ctx);
        }
        let gemfile = find_gemfile(host.fs, &self.config.path, base)?;
        let gem_binary = self
            .config
            .gem_binary
            .as_deref()
            .unwrap_or(record.gem_binary.as_path());
        let bundler_binary = discover_bundler_binary(host.exec, record, gem_binary)?;
        tracing::debug!(
            "Bundle {} uses {} with {}",
            self.name,
            gemfile.display(),
            bundler_binary.display()
        );
        let ctx = BundleContext {
            gemfile,
            bundler_binary,
            binstubs: self.config.binstubs.clone(),
            vendor: self.config.vendor.clone(),
            deployment: self.config.deployment,
        };
        Ok(self.context.get_or_init(|| ctx))
    }

    /// Command line flags for bundler.
    pub fn bundler_options(&self) -> Vec<String> {
        let c = &self.config;
        let mut opts = Vec::new();
        if c.binstubs.is_enabled() {
            opts.push(match c.binstubs.value() {
                Some(dir) => format!("--binstubs={}", dir),
                None => "--binstubs".to_string(),
            });
        }
        if c.vendor.is_enabled() {
            opts.push(format!(
                "--path={}",
                c.vendor.value().unwrap_or(DEFAULT_VENDOR_PATH)
            ));
        }
        if c.deployment {
            opts.push("--deployment".to_string());
        }
        if let Some(jobs) = c.jobs {
            opts.push(format!("--jobs={}", jobs));
        }
        if let Some(retry) = c.retry {
            opts.push(format!("--retry={}", retry));
        }
        if !c.without.is_empty() {
            opts.push("--without".to_string());
            opts.extend(c.without.iter().cloned());
        }
        opts
    }

    /// The plan for `bundle <subcommand>`.
    pub fn plan(
        &self,
        host: &Host<'_>,
        record: &RuntimeRecord,
        base: &Path,
        subcommand: &str,
    ) -> Result<ExecutionPlan> {
        let ctx = self.context(host, record, base)?;
        let mut argv = vec![
            record.ruby_binary.display().to_string(),
            ctx.bundler_binary.display().to_string(),
            subcommand.to_string(),
        ];
        argv.extend(self.bundler_options());

        let mut environment = record.environment.clone();
        environment.insert(
            BUNDLE_GEMFILE_ENV.to_string(),
            ctx.gemfile.display().to_string(),
        );

        Ok(ExecutionPlan::new(CommandSpec::Argv(argv))
            .with_environment(environment)
            .with_directory(ctx.root())
            .with_user(self.config.user.clone()))
    }

    /// `bundle install`, returning whether any gem was installed.
    pub fn install(&self, host: &Host<'_>, record: &RuntimeRecord, base: &Path) -> Result<bool> {
        self.run(host, record, base, "install")
    }

    /// `bundle update`, returning whether any gem was installed.
    pub fn update(&self, host: &Host<'_>, record: &RuntimeRecord, base: &Path) -> Result<bool> {
        self.run(host, record, base, "update")
    }

    fn run(
        &self,
        host: &Host<'_>,
        record: &RuntimeRecord,
        base: &Path,
        subcommand: &str,
    ) -> Result<bool> {
        let plan = self.plan(host, record, base, subcommand)?;
        tracing::info!("Running bundle {} for {}", subcommand, self.name);
        let output = run_checked(host.exec, &plan)?;
        Ok(output.stdout.contains(INSTALLING_MARKER))
    }
}

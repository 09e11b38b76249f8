//! A provisioning run: configured runtimes and bundles plus ordered steps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::bundle::BundleInstall;
use crate::command::{CommandComposer, CommandSpec, ExecutionPlan};
use crate::config::{RigConfig, StepAction, StepConfig, Toggle};
use crate::error::{Result, RigError};
use crate::gems::GemPackage;
use crate::ports::exec::run_checked;
use crate::ports::{expand_path, Host};
use crate::runtime::providers::Preinstalled;
use crate::runtime::{ProviderSelector, RubyRuntime, RuntimeRecord};
use crate::shell::{default_user, home_directory};

/// Runtime used when a command names neither a runtime nor a bundle.
const PATH_RUNTIME: &str = "(path)";

/// Progress events emitted while steps run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        title: &'a str,
        index: usize,
        total: usize,
    },
    /// A step finished.
    StepFinished { title: &'a str, changed: bool },
}

/// How one step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub title: String,
    pub changed: bool,
}

/// Result of running every step.
#[derive(Debug, Default)]
pub struct RunResult {
    pub steps: Vec<StepOutcome>,
}

impl RunResult {
    /// Whether any step changed the host.
    pub fn changed(&self) -> bool {
        self.steps.iter().any(|s| s.changed)
    }

    /// Number of steps that changed the host.
    pub fn changed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.changed).count()
    }
}

/// Where and as whom an ad hoc command runs.
#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    pub runtime: Option<String>,
    pub bundle: Option<String>,
    pub environment: BTreeMap<String, String>,
    /// Relative paths are taken from the project root.
    pub directory: Option<PathBuf>,
    pub user: Option<String>,
}

/// One provisioning run.
///
/// Runtimes and bundles are built once from configuration; their records
/// and contexts are resolved lazily and reused for every step.
pub struct ProvisionRun<'a> {
    config: &'a RigConfig,
    host: Host<'a>,
    base: PathBuf,
    inherited_path: String,
    runtimes: BTreeMap<String, RubyRuntime>,
    bundles: BTreeMap<String, BundleInstall>,
    path_runtime: RubyRuntime,
    default_user: Option<String>,
}

impl<'a> ProvisionRun<'a> {
    /// Build runtimes and bundles for `config`.
    ///
    /// `base` is the project root; relative bundle paths and directories
    /// resolve against it. `inherited_path` is the `PATH` commands start
    /// from.
    pub fn new(
        config: &'a RigConfig,
        host: Host<'a>,
        base: impl Into<PathBuf>,
        inherited_path: impl Into<String>,
    ) -> Result<Self> {
        Self::with_selector(config, host, base, inherited_path, &ProviderSelector::new())
    }

    /// Like [`ProvisionRun::new`] with a custom provider priority.
    pub fn with_selector(
        config: &'a RigConfig,
        host: Host<'a>,
        base: impl Into<PathBuf>,
        inherited_path: impl Into<String>,
        selector: &ProviderSelector,
    ) -> Result<Self> {
        let inherited_path = inherited_path.into();

        let runtimes = config
            .runtimes
            .iter()
            .map(|(name, rc)| {
                RubyRuntime::from_config(name, rc, host.platform, selector)
                    .map(|rt| (name.clone(), rt))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let bundles = config
            .bundles
            .iter()
            .map(|(name, bc)| (name.clone(), BundleInstall::new(name, bc.clone())))
            .collect();

        let path_runtime = RubyRuntime::new(
            PATH_RUNTIME,
            "",
            Toggle::Flag(false),
            Box::new(Preinstalled::with_search_path(None, inherited_path.clone())),
        );

        Ok(Self {
            config,
            host,
            base: base.into(),
            inherited_path,
            runtimes,
            bundles,
            path_runtime,
            default_user: default_user(),
        })
    }

    /// User for commands that do not name one (`None` = current user).
    pub fn with_default_user(mut self, user: Option<String>) -> Self {
        self.default_user = user;
        self
    }

    pub fn host(&self) -> &Host<'a> {
        &self.host
    }

    /// A configured runtime.
    pub fn runtime(&self, name: &str) -> Result<&RubyRuntime> {
        self.runtimes.get(name).ok_or_else(|| RigError::UnknownRuntime {
            name: name.to_string(),
        })
    }

    /// A configured bundle.
    pub fn bundle(&self, name: &str) -> Result<&BundleInstall> {
        self.bundles.get(name).ok_or_else(|| RigError::UnknownBundle {
            name: name.to_string(),
        })
    }

    /// Resolved record of a configured runtime.
    pub fn record(&self, runtime: &str) -> Result<&RuntimeRecord> {
        self.runtime(runtime)?.record(&self.host)
    }

    /// Compose the plan for an ad hoc command without running it.
    ///
    /// The runtime is the requested one, else the bundle's, else the first
    /// `ruby` on the inherited `PATH`.
    pub fn plan_command(&self, command: &CommandSpec, request: &ExecRequest) -> Result<ExecutionPlan> {
        let bundle = request.bundle.as_deref().map(|b| self.bundle(b)).transpose()?;
        let runtime = match (request.runtime.as_deref(), bundle) {
            (Some(name), _) => self.runtime(name)?,
            (None, Some(b)) => self.runtime(b.runtime())?,
            (None, None) => &self.path_runtime,
        };
        let record = runtime.record(&self.host)?;
        let context = bundle
            .map(|b| b.context(&self.host, record, &self.base))
            .transpose()?;

        let user = request.user.clone().or_else(|| self.default_user.clone());
        let directory = match &request.directory {
            Some(dir) => expand_path(dir, &self.base),
            None => home_directory(user.as_deref()),
        };

        let mut extra: BTreeMap<String, String> = self
            .config
            .settings
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        extra.extend(request.environment.clone());

        CommandComposer::new(self.host.fs, record)
            .with_bundle(context)
            .with_inherited_path(self.inherited_path.clone())
            .with_directory(directory)
            .with_user(user)
            .compose(command, &extra)
    }

    /// Run an ad hoc command. Commands always count as a change.
    pub fn execute(&self, command: &CommandSpec, request: &ExecRequest) -> Result<bool> {
        let plan = self.plan_command(command, request)?;
        tracing::info!("Executing {}", plan.command);
        run_checked(self.host.exec, &plan)?;
        Ok(true)
    }

    /// Run one step, returning whether it changed anything.
    pub fn run_step(&self, step: &StepConfig) -> Result<bool> {
        match &step.action {
            StepAction::InstallRuntime { runtime } => self.runtime(runtime)?.install(&self.host),
            StepAction::UninstallRuntime { runtime } => {
                self.runtime(runtime)?.uninstall(&self.host)
            }
            StepAction::Gem {
                runtime,
                name,
                version,
                state,
                source,
                options,
            } => {
                let record = self.record(runtime)?;
                let gem = GemPackage {
                    name: name.clone(),
                    version: version.clone(),
                    action: *state,
                    source: source.clone(),
                    options: options.clone(),
                };
                gem.apply(self.host.exec, record)
            }
            StepAction::BundleInstall { bundle } => {
                let (b, record) = self.bundle_with_record(bundle)?;
                b.install(&self.host, record, &self.base)
            }
            StepAction::BundleUpdate { bundle } => {
                let (b, record) = self.bundle_with_record(bundle)?;
                b.update(&self.host, record, &self.base)
            }
            StepAction::Execute {
                runtime,
                bundle,
                command,
                environment,
                directory,
                user,
            } => self.execute(
                command,
                &ExecRequest {
                    runtime: runtime.clone(),
                    bundle: bundle.clone(),
                    environment: environment.clone(),
                    directory: directory.clone(),
                    user: user.clone(),
                },
            ),
        }
    }

    fn bundle_with_record(&self, name: &str) -> Result<(&BundleInstall, &RuntimeRecord)> {
        let bundle = self.bundle(name)?;
        let record = self.record(bundle.runtime())?;
        Ok((bundle, record))
    }

    /// Run every configured step in order. The first failure stops the run.
    pub fn run(&self, mut on_progress: impl FnMut(RunProgress<'_>)) -> Result<RunResult> {
        let total = self.config.steps.len();
        let mut result = RunResult::default();

        for (index, step) in self.config.steps.iter().enumerate() {
            let title = step.display_title();
            on_progress(RunProgress::StepStarting {
                title: &title,
                index,
                total,
            });

            let changed = self.run_step(step)?;
            tracing::debug!("Step {} finished (changed: {})", title, changed);

            on_progress(RunProgress::StepFinished {
                title: &title,
                changed,
            });
            result.steps.push(StepOutcome { title, changed });
        }

        Ok(result)
    }

    /// Project root.
    pub fn base(&self) -> &Path {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformFamily, PlatformIdentity};
    use crate::ports::exec::ExecOutput;
    use crate::ports::fake::{FakeFilesystem, FakeHost, FakePackages};

    const GEM_ENV: &str = "  - EXECUTABLE DIRECTORY: /usr/local/bin\n";

    fn config(yaml: &str) -> RigConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn ubuntu() -> FakeHost {
        FakeHost::new(PlatformIdentity::new(PlatformFamily::Ubuntu, "14.04"))
    }

    const STUB_APP: &str = r#"
runtimes:
  default:
    provider: stub
    options:
      ruby_binary: /opt/ruby/bin/ruby
bundles:
  app:
    path: app
    runtime: default
"#;

    #[test]
    fn runs_steps_in_order_and_reports_changes() {
        let fake = ubuntu().with_packages(
            FakePackages::new()
                .with_candidate("ruby2.0", "2.0.0.484-1ubuntu2")
                .with_candidate("ruby2.0-dev", "2.0.0.484-1ubuntu2"),
        );
        let cfg = config(
            r#"
runtimes:
  default:
    version: "2.0"
    bundler_version: false
steps:
  - action: install_runtime
    runtime: default
  - title: Check version
    action: execute
    runtime: default
    command: [-v]
"#,
        );
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "/usr/bin").unwrap();

        let mut seen = Vec::new();
        let result = run
            .run(|p| {
                if let RunProgress::StepStarting { title, index, total } = p {
                    seen.push(format!("{}/{} {}", index + 1, total, title));
                }
            })
            .unwrap();

        assert_eq!(seen, vec!["1/2 install runtime default", "2/2 Check version"]);
        assert_eq!(result.changed_count(), 2);
        assert_eq!(fake.packages.installed("ruby2.0-dev").as_deref(), Some("2.0.0.484-1ubuntu2"));
        assert!(fake.exec.ran("/usr/bin/ruby2.0 -v"));
    }

    #[test]
    fn second_run_changes_nothing_but_execute() {
        let fake = ubuntu().with_packages(
            FakePackages::new()
                .with_candidate("ruby2.0", "2.0.0.484-1ubuntu2")
                .with_installed("ruby2.0", "2.0.0.484-1ubuntu2"),
        );
        let cfg = config(
            r#"
runtimes:
  default:
    version: "2.0"
    bundler_version: false
    options:
      dev_package: false
steps:
  - action: install_runtime
    runtime: default
"#,
        );
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "").unwrap();
        assert!(!run.run(|_| {}).unwrap().changed());
    }

    #[test]
    fn bundle_install_uses_bundle_runtime() {
        let fake = ubuntu().with_fs(FakeFilesystem::new().with_file("/srv/app/Gemfile"));
        fake.exec
            .respond("/opt/ruby/bin/ruby /opt/ruby/bin/gem environment", ExecOutput::ok(GEM_ENV));
        fake.exec.respond(
            "/opt/ruby/bin/ruby /usr/local/bin/bundle install",
            ExecOutput::ok("Installing rack 1.6.4\n"),
        );
        let cfg = config(&format!(
            "{}steps:\n  - action: bundle_install\n    bundle: app\n",
            STUB_APP
        ));
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "").unwrap();
        let result = run.run(|_| {}).unwrap();
        assert!(result.changed());
        let plan = fake.exec.last_plan().unwrap();
        assert_eq!(plan.environment["BUNDLE_GEMFILE"], "/srv/app/Gemfile");
    }

    #[test]
    fn plan_command_inside_bundle() {
        let fake = ubuntu().with_fs(
            FakeFilesystem::new()
                .with_file("/srv/app/Gemfile")
                .with_executable("/usr/local/bin/rake"),
        );
        fake.exec
            .respond("/opt/ruby/bin/ruby /opt/ruby/bin/gem environment", ExecOutput::ok(GEM_ENV));
        let mut cfg = config(STUB_APP);
        cfg.settings.env.insert("RAILS_ENV".into(), "production".into());
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "/usr/bin")
            .unwrap()
            .with_default_user(Some("root".into()));

        let mut environment = BTreeMap::new();
        environment.insert("RAILS_ENV".to_string(), "staging".to_string());
        let plan = run
            .plan_command(
                &CommandSpec::from("rake assets"),
                &ExecRequest {
                    bundle: Some("app".into()),
                    environment,
                    directory: Some("app".into()),
                    ..ExecRequest::default()
                },
            )
            .unwrap();

        assert_eq!(
            plan.command,
            CommandSpec::Shell(
                "/opt/ruby/bin/ruby /usr/local/bin/bundle exec /opt/ruby/bin/ruby /usr/local/bin/rake assets"
                    .into()
            )
        );
        assert_eq!(plan.environment["RAILS_ENV"], "staging");
        assert_eq!(plan.directory, PathBuf::from("/srv/app"));
        assert_eq!(plan.user.as_deref(), Some("root"));
    }

    #[test]
    fn plan_without_runtime_uses_ruby_on_path() {
        let fake = ubuntu().with_fs(FakeFilesystem::new().with_executable("/usr/local/bin/ruby"));
        let cfg = RigConfig::default();
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "/usr/local/bin:/usr/bin")
            .unwrap()
            .with_default_user(Some("root".into()));
        let plan = run
            .plan_command(&CommandSpec::from("-e 'puts 1'"), &ExecRequest::default())
            .unwrap();
        assert_eq!(plan.command, CommandSpec::Shell("/usr/local/bin/ruby -e 'puts 1'".into()));
        assert_eq!(plan.directory, PathBuf::from("/"));
    }

    #[test]
    fn unprivileged_default_keeps_current_user() {
        let fake = ubuntu().with_fs(FakeFilesystem::new().with_executable("/usr/local/bin/ruby"));
        let cfg = RigConfig::default();
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "/usr/local/bin")
            .unwrap()
            .with_default_user(None);

        let plan = run
            .plan_command(&CommandSpec::argv(["-v"]), &ExecRequest::default())
            .unwrap();
        assert_eq!(plan.user, None);
        assert_eq!(plan.directory, home_directory(None));

        let plan = run
            .plan_command(
                &CommandSpec::argv(["-v"]),
                &ExecRequest {
                    user: Some("deploy".into()),
                    ..ExecRequest::default()
                },
            )
            .unwrap();
        assert_eq!(plan.user.as_deref(), Some("deploy"));
    }

    #[test]
    fn gem_step_runs_through_runtime() {
        let fake = ubuntu();
        let cfg = config(&format!(
            "{}steps:\n  - action: gem\n    runtime: default\n    name: rake\n    version: \"10.4.2\"\n",
            STUB_APP
        ));
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "").unwrap();
        assert!(run.run(|_| {}).unwrap().changed());
        assert!(fake
            .exec
            .ran("/opt/ruby/bin/ruby /opt/ruby/bin/gem install rake --version 10.4.2"));
    }

    #[test]
    fn unknown_names_are_errors() {
        let fake = ubuntu();
        let cfg = RigConfig::default();
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "").unwrap();
        assert!(matches!(run.runtime("nope"), Err(RigError::UnknownRuntime { .. })));
        assert!(matches!(run.bundle("nope"), Err(RigError::UnknownBundle { .. })));
    }

    #[test]
    fn failing_step_stops_the_run() {
        let fake = ubuntu();
        fake.exec.respond("/opt/ruby/bin/ruby false", ExecOutput::failed(1, "nope"));
        let cfg = config(&format!(
            "{}steps:\n  - action: execute\n    runtime: default\n    command: [\"false\"]\n  - action: execute\n    runtime: default\n    command: [\"true\"]\n",
            STUB_APP
        ));
        let run = ProvisionRun::new(&cfg, fake.host(), "/srv", "").unwrap();
        let err = run.run(|_| {}).unwrap_err();
        assert!(matches!(err, RigError::CommandFailed { code: Some(1), .. }));
        assert_eq!(fake.exec.plans().len(), 1);
    }

    #[test]
    fn unsupported_platform_needs_explicit_provider() {
        let fake = FakeHost::new(PlatformIdentity::new(PlatformFamily::Other, ""));
        let cfg = config("runtimes:\n  default:\n    version: \"2.1\"\n");
        let err = ProvisionRun::new(&cfg, fake.host(), "/", "").err().unwrap();
        assert!(matches!(err, RigError::NoAutoProvider { .. }));
    }
}

//! Build the exact command, environment and directory for running
//! something under a runtime.

use crate::bundle::context::{BundleContext, BUNDLE_GEMFILE_ENV};
use crate::bundle::path::extra_path_for_bundle;
use crate::command::lookup::{prepend_search_path, resolve_program};
use crate::command::plan::{CommandSpec, ExecutionPlan};
use crate::error::{RigError, Result};
use crate::ports::Filesystem;
use crate::runtime::RuntimeRecord;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Composes [`ExecutionPlan`]s for one runtime and, optionally, one bundle.
///
/// Without a bundle the command is prefixed with the runtime binary:
///
/// ```text
/// myapp.rb  ->  /usr/bin/ruby myapp.rb
/// ```
///
/// With a bundle it runs through `bundle exec`, itself invoked with the
/// runtime, and the wrapped program is prefixed with the runtime again so
/// a shebang cannot pick another interpreter:
///
/// ```text
/// rake db:migrate  ->  /usr/bin/ruby /usr/local/bin/bundle exec /usr/bin/ruby /srv/app/bin/rake db:migrate
/// ```
pub struct CommandComposer<'a> {
    fs: &'a dyn Filesystem,
    runtime: &'a RuntimeRecord,
    bundle: Option<&'a BundleContext>,
    inherited_path: String,
    directory: PathBuf,
    user: Option<String>,
}

impl<'a> CommandComposer<'a> {
    /// Composer for `runtime`, run from `/` with an empty inherited `PATH`.
    pub fn new(fs: &'a dyn Filesystem, runtime: &'a RuntimeRecord) -> Self {
        Self {
            fs,
            runtime,
            bundle: None,
            inherited_path: String::new(),
            directory: PathBuf::from("/"),
            user: None,
        }
    }

    /// Run inside a bundle.
    pub fn with_bundle(mut self, bundle: Option<&'a BundleContext>) -> Self {
        self.bundle = bundle;
        self
    }

    /// `PATH` the bundle directory is prepended to.
    pub fn with_inherited_path(mut self, path: impl Into<String>) -> Self {
        self.inherited_path = path.into();
        self
    }

    /// Working directory for the plan.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// User to run as.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    /// Compose the plan for `command`.
    ///
    /// The result has the same shape as `command`. `extra_env` wins over
    /// everything else.
    pub fn compose(
        &self,
        command: &CommandSpec,
        extra_env: &BTreeMap<String, String>,
    ) -> Result<ExecutionPlan> {
        let mut environment = self.runtime.environment.clone();

        let composed = match self.bundle {
            None => self.runtime_command(command),
            Some(bundle) => {
                environment.insert(
                    BUNDLE_GEMFILE_ENV.to_string(),
                    bundle.gemfile.display().to_string(),
                );
                self.bundle_command(bundle, command)?
            }
        };

        environment.extend(extra_env.iter().map(|(k, v)| (k.clone(), v.clone())));

        tracing::debug!("Composed command: {}", composed);
        Ok(ExecutionPlan {
            command: composed,
            environment,
            directory: self.directory.clone(),
            user: self.user.clone(),
        })
    }

    fn ruby(&self) -> String {
        self.runtime.ruby_binary.display().to_string()
    }

    fn runtime_command(&self, command: &CommandSpec) -> CommandSpec {
        let ruby = self.ruby();
        match command {
            CommandSpec::Shell(line) => {
                let quoted = shlex::try_quote(&ruby)
                    .map(|q| q.into_owned())
                    .unwrap_or(ruby);
                CommandSpec::Shell(format!("{} {}", quoted, line))
            }
            CommandSpec::Argv(args) => {
                CommandSpec::Argv(std::iter::once(ruby).chain(args.iter().cloned()).collect())
            }
        }
    }

    fn bundle_command(&self, bundle: &BundleContext, command: &CommandSpec) -> Result<CommandSpec> {
        let extra = extra_path_for_bundle(self.fs, bundle)?;
        let search_path = prepend_search_path(&extra, &self.inherited_path);

        let words = match command {
            CommandSpec::Shell(line) => shlex::split(line).ok_or_else(|| {
                RigError::Other(anyhow::anyhow!("Unable to parse command line: {}", line))
            })?,
            CommandSpec::Argv(args) => args.clone(),
        };
        let (program, rest) = words.split_first().ok_or_else(|| RigError::CommandNotFound {
            command: String::new(),
            path: search_path.clone(),
        })?;
        let program = resolve_program(self.fs, program, &search_path, &self.directory)?;

        let ruby = self.ruby();
        let mut argv = vec![
            ruby.clone(),
            bundle.bundler_binary.display().to_string(),
            "exec".to_string(),
            ruby,
            program,
        ];
        argv.extend(rest.iter().cloned());

        Ok(match command {
            CommandSpec::Shell(_) => {
                let joined = shlex::try_join(argv.iter().map(String::as_str))
                    .unwrap_or_else(|_| argv.join(" "));
                CommandSpec::Shell(joined)
            }
            CommandSpec::Argv(_) => CommandSpec::Argv(argv),
        })
    }
}

/// Recover the runtime and companion binaries from a composed command.
///
/// For a bundle plan the companion is the bundler binary.
pub fn leading_binaries(command: &CommandSpec) -> Option<(PathBuf, PathBuf)> {
    let words = match command {
        CommandSpec::Shell(line) => shlex::split(line)?,
        CommandSpec::Argv(args) => args.clone(),
    };
    match words.as_slice() {
        [first, second, ..] => Some((PathBuf::from(first), PathBuf::from(second))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toggle;
    use crate::ports::fake::FakeFilesystem;

    fn runtime() -> RuntimeRecord {
        RuntimeRecord {
            ruby_binary: "/ruby".into(),
            gem_binary: "/gem".into(),
            environment: BTreeMap::new(),
            bundler_version: Toggle::on(),
        }
    }

    fn bundle() -> BundleContext {
        BundleContext {
            gemfile: "/srv/Gemfile".into(),
            bundler_binary: "/bundle".into(),
            binstubs: Toggle::default(),
            vendor: Toggle::default(),
            deployment: false,
        }
    }

    #[test]
    fn string_command_without_bundle() {
        let fs = FakeFilesystem::new();
        let record = runtime();
        let plan = CommandComposer::new(&fs, &record)
            .compose(&CommandSpec::from("myapp.rb"), &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.command, CommandSpec::Shell("/ruby myapp.rb".into()));
        assert!(plan.environment.is_empty());
    }

    #[test]
    fn argv_command_without_bundle_stays_argv() {
        let fs = FakeFilesystem::new();
        let record = runtime();
        let plan = CommandComposer::new(&fs, &record)
            .compose(&CommandSpec::argv(["-e", "puts 1"]), &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.command, CommandSpec::argv(["/ruby", "-e", "puts 1"]));
    }

    #[test]
    fn string_command_with_bundle() {
        let fs = FakeFilesystem::new().with_file("/srv/myapp.rb");
        let record = runtime();
        let ctx = bundle();
        let plan = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_directory("/srv")
            .compose(&CommandSpec::from("myapp.rb"), &BTreeMap::new())
            .unwrap();
        assert_eq!(
            plan.command,
            CommandSpec::Shell("/ruby /bundle exec /ruby myapp.rb".into())
        );
        assert_eq!(plan.environment["BUNDLE_GEMFILE"], "/srv/Gemfile");
        assert_eq!(plan.directory, PathBuf::from("/srv"));
    }

    #[test]
    fn bundle_program_resolved_on_composed_path() {
        let fs = FakeFilesystem::new()
            .with_executable("/srv/bin/rake")
            .with_executable("/usr/bin/rake");
        let record = runtime();
        let ctx = BundleContext {
            binstubs: Toggle::on(),
            ..bundle()
        };
        let plan = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_inherited_path("/usr/bin:/bin")
            .compose(&CommandSpec::argv(["rake", "db:migrate"]), &BTreeMap::new())
            .unwrap();
        assert_eq!(
            plan.command,
            CommandSpec::argv(["/ruby", "/bundle", "exec", "/ruby", "/srv/bin/rake", "db:migrate"])
        );
    }

    #[test]
    fn unknown_program_in_bundle_fails() {
        let fs = FakeFilesystem::new();
        let record = runtime();
        let ctx = bundle();
        let err = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_inherited_path("/usr/bin")
            .compose(&CommandSpec::from("nope --flag"), &BTreeMap::new())
            .unwrap_err();
        match err {
            RigError::CommandNotFound { command, path } => {
                assert_eq!(command, "nope");
                assert_eq!(path, "/:/usr/bin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn environment_layering() {
        let fs = FakeFilesystem::new().with_file("/srv/myapp.rb");
        let mut record = runtime();
        record
            .environment
            .insert("BUNDLE_GEMFILE".into(), "/from/runtime".into());
        record.environment.insert("GEM_HOME".into(), "/gems".into());
        let ctx = bundle();

        let plan = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_directory("/srv")
            .compose(&CommandSpec::from("myapp.rb"), &BTreeMap::new())
            .unwrap();
        assert_eq!(plan.environment["BUNDLE_GEMFILE"], "/srv/Gemfile");
        assert_eq!(plan.environment["GEM_HOME"], "/gems");

        let mut extra = BTreeMap::new();
        extra.insert("BUNDLE_GEMFILE".to_string(), "/custom/Gemfile".to_string());
        extra.insert("GEM_HOME".to_string(), "/mine".to_string());
        let plan = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_directory("/srv")
            .compose(&CommandSpec::from("myapp.rb"), &extra)
            .unwrap();
        assert_eq!(plan.environment["BUNDLE_GEMFILE"], "/custom/Gemfile");
        assert_eq!(plan.environment["GEM_HOME"], "/mine");
    }

    #[test]
    fn runtime_path_with_spaces_is_quoted() {
        let fs = FakeFilesystem::new();
        let mut record = runtime();
        record.ruby_binary = "/opt/my ruby/bin/ruby".into();
        let plan = CommandComposer::new(&fs, &record)
            .compose(&CommandSpec::from("-v"), &BTreeMap::new())
            .unwrap();
        let words = shlex::split(&plan.command.to_string()).unwrap();
        assert_eq!(words, vec!["/opt/my ruby/bin/ruby", "-v"]);
    }

    #[test]
    fn leading_binaries_recover_record_paths() {
        let fs = FakeFilesystem::new().with_file("/srv/myapp.rb");
        let record = RuntimeRecord {
            ruby_binary: "/usr/bin/ruby2.1".into(),
            gem_binary: "/usr/bin/gem2.1".into(),
            environment: BTreeMap::new(),
            bundler_version: Toggle::on(),
        };

        let plan = CommandComposer::new(&fs, &record)
            .compose(&CommandSpec::argv(["/usr/bin/gem2.1", "list"]), &BTreeMap::new())
            .unwrap();
        assert_eq!(
            leading_binaries(&plan.command),
            Some((record.ruby_binary.clone(), record.gem_binary.clone()))
        );

        let ctx = BundleContext {
            bundler_binary: "/usr/local/bin/bundle".into(),
            ..bundle()
        };
        let plan = CommandComposer::new(&fs, &record)
            .with_bundle(Some(&ctx))
            .with_directory("/srv")
            .compose(&CommandSpec::from("myapp.rb"), &BTreeMap::new())
            .unwrap();
        assert_eq!(
            leading_binaries(&plan.command),
            Some((record.ruby_binary.clone(), ctx.bundler_binary.clone()))
        );
    }
}

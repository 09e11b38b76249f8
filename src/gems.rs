//! Gems managed through a runtime's gem binary.
//!
//! Every gem command is run as `<ruby> <gem> ...` with the runtime's
//! environment so that the interpreter that owns the gem directory is the
//! one doing the work.

use crate::command::{CommandSpec, ExecutionPlan};
use crate::error::{RigError, Result};
use crate::ports::exec::{run_checked, Executor};
use crate::ports::PackageAction;
use crate::runtime::RuntimeRecord;
use std::path::Path;

/// A gem and the state it should be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemPackage {
    pub name: String,
    pub version: Option<String>,
    pub action: PackageAction,
    pub source: Option<String>,
    /// Extra command line options, split shell-style.
    pub options: Option<String>,
}

impl GemPackage {
    /// Install the latest version of a gem.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            action: PackageAction::Install,
            source: None,
            options: None,
        }
    }

    /// Pin a version.
    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Set the action.
    pub fn with_action(mut self, action: PackageAction) -> Self {
        self.action = action;
        self
    }

    fn plan(&self, record: &RuntimeRecord, gem_binary: &Path, args: Vec<String>) -> ExecutionPlan {
        let mut argv = vec![
            record.ruby_binary.display().to_string(),
            gem_binary.display().to_string(),
        ];
        argv.extend(args);
        ExecutionPlan::new(CommandSpec::Argv(argv)).with_environment(record.environment.clone())
    }

    fn version_args(&self, flag: &str) -> Vec<String> {
        self.version
            .iter()
            .flat_map(|v| [flag.to_string(), v.clone()])
            .collect()
    }

    fn extra_args(&self) -> Result<Vec<String>> {
        let mut args = Vec::new();
        if let Some(source) = &self.source {
            args.push("--source".to_string());
            args.push(source.clone());
        }
        if let Some(options) = &self.options {
            let words = shlex::split(options).ok_or_else(|| {
                RigError::Other(anyhow::anyhow!(
                    "Unable to parse options for gem {}: {}",
                    self.name,
                    options
                ))
            })?;
            args.extend(words);
        }
        Ok(args)
    }

    /// Whether the gem (at the pinned version, if any) is installed.
    pub fn is_installed(&self, exec: &dyn Executor, record: &RuntimeRecord) -> Result<bool> {
        let mut args = vec!["list".to_string(), "-i".to_string(), format!("^{}$", self.name)];
        args.extend(self.version_args("-v"));
        let output = exec.run(&self.plan(record, &record.gem_binary, args))?;
        Ok(output.stdout.trim() == "true")
    }

    /// Bring the gem into the requested state, returning whether anything changed.
    pub fn apply(&self, exec: &dyn Executor, record: &RuntimeRecord) -> Result<bool> {
        let installed = self.is_installed(exec, record)?;
        let gem = &record.gem_binary;

        match self.action {
            PackageAction::Install if installed => Ok(false),
            PackageAction::Install => self.install(exec, record),
            PackageAction::Upgrade if !installed => self.install(exec, record),
            PackageAction::Upgrade => {
                let mut args = vec!["update".to_string(), self.name.clone()];
                args.extend(self.extra_args()?);
                let output = run_checked(exec, &self.plan(record, gem, args))?;
                Ok(output.stdout.contains("Gems updated"))
            }
            PackageAction::Remove | PackageAction::Purge if !installed => Ok(false),
            PackageAction::Remove | PackageAction::Purge => {
                let mut args = vec![
                    "uninstall".to_string(),
                    self.name.clone(),
                    "--executables".to_string(),
                ];
                match &self.version {
                    Some(v) => args.extend(["-v".to_string(), v.clone()]),
                    None => args.push("--all".to_string()),
                }
                tracing::info!("Removing gem {}", self.name);
                run_checked(exec, &self.plan(record, gem, args))?;
                Ok(true)
            }
        }
    }

    fn install(&self, exec: &dyn Executor, record: &RuntimeRecord) -> Result<bool> {
        let mut args = vec!["install".to_string(), self.name.clone()];
        args.extend(self.version_args("--version"));
        args.extend(self.extra_args()?);
        tracing::info!(
            "Installing gem {}{}",
            self.name,
            self.version
                .as_deref()
                .map(|v| format!(" {}", v))
                .unwrap_or_default()
        );
        run_checked(exec, &self.plan(record, &record.gem_binary, args))?;
        Ok(true)
    }
}

//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`Project`] for the config and platform every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, validate, RigConfig};
use crate::error::{Result, RigError};
use crate::platform::PlatformIdentity;
use crate::shell::{OutputLine, ShellExecutor};
use crate::ui::{OutputMode, UserInterface};

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Project root plus the optional config file override.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config_override: Option<PathBuf>,
}

impl Project {
    pub fn new(root: PathBuf, config_override: Option<PathBuf>) -> Self {
        Self {
            root,
            config_override,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load and validate the configuration.
    ///
    /// With `required` unset a missing config is an empty one, so ad hoc
    /// commands work outside a project.
    pub fn load(&self, required: bool) -> Result<RigConfig> {
        let config = match load_config(&self.root, self.config_override.as_deref()) {
            Ok(config) => config,
            Err(RigError::ConfigNotFound { path }) if !required => {
                tracing::debug!("No config at {}, using defaults", path.display());
                RigConfig::default()
            }
            Err(e) => return Err(e),
        };
        validate(&config)?;
        Ok(config)
    }

    /// Load the config and let its `default_output` apply when no flag set one.
    pub fn load_for(&self, ui: &mut dyn UserInterface, required: bool) -> Result<RigConfig> {
        let config = self.load(required)?;
        if ui.output_mode() == OutputMode::Normal {
            ui.set_output_mode(config.settings.default_output.into());
        }
        Ok(config)
    }
}

/// Platform from `settings.platform`, else detected.
pub fn resolve_platform(config: &RigConfig) -> Result<PlatformIdentity> {
    match &config.settings.platform {
        Some(value) => value
            .parse()
            .map_err(|message| RigError::ConfigValidationError { message }),
        None => Ok(PlatformIdentity::detect()),
    }
}

/// `PATH` of this process, the starting point for command lookup.
pub fn inherited_path() -> String {
    std::env::var("PATH").unwrap_or_default()
}

/// Executor for real commands; with `stream` set, child output is echoed
/// as it arrives.
pub fn shell_executor(stream: bool) -> ShellExecutor {
    if !stream {
        return ShellExecutor::new();
    }
    ShellExecutor::streaming(Arc::new(|line| match line {
        OutputLine::Stdout(line) => println!("{}", line),
        OutputLine::Stderr(line) => eprintln!("{}", line),
    }))
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project: Project,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project.
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        self.project.root()
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = self.project.clone();
        match &cli.command {
            Some(Commands::Run) | None => super::run::RunCommand::new(project).execute(ui),
            Some(Commands::Install(args)) => {
                super::install::InstallCommand::install(project, args.clone()).execute(ui)
            }
            Some(Commands::Uninstall(args)) => {
                super::install::InstallCommand::uninstall(project, args.clone()).execute(ui)
            }
            Some(Commands::Exec(args)) => {
                super::exec::ExecCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Plan(args)) => {
                super::plan::PlanCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Candidates(args)) => {
                super::candidates::CandidatesCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Detect) => super::detect::DetectCommand::new(project).execute(ui),
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}

//! Install and uninstall commands.
//!
//! `rubyrig install <runtime>` installs one runtime and its bundler;
//! `rubyrig uninstall <runtime>` removes it.

use crate::cli::args::RuntimeArgs;
use crate::error::Result;
use crate::runner::{ProvisionRun, SystemHost};
use crate::ui::UserInterface;

use super::dispatcher::{
    inherited_path, resolve_platform, shell_executor, Command, CommandResult, Project,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Install,
    Uninstall,
}

/// The install/uninstall command implementation.
pub struct InstallCommand {
    project: Project,
    args: RuntimeArgs,
    direction: Direction,
}

impl InstallCommand {
    /// Install the named runtime.
    pub fn install(project: Project, args: RuntimeArgs) -> Self {
        Self {
            project,
            args,
            direction: Direction::Install,
        }
    }

    /// Remove the named runtime.
    pub fn uninstall(project: Project, args: RuntimeArgs) -> Self {
        Self {
            project,
            args,
            direction: Direction::Uninstall,
        }
    }
}

impl Command for InstallCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.load_for(ui, true)?;
        let platform = resolve_platform(&config)?;
        let system = SystemHost::new(platform, shell_executor(ui.output_mode().shows_commands()));
        let run = ProvisionRun::new(&config, system.host(), self.project.root(), inherited_path())?;

        let name = &self.args.runtime;
        let runtime = run.runtime(name)?;
        ui.show_field("provider", runtime.provider_kind().as_str());

        let (changed, verb) = match self.direction {
            Direction::Install => (runtime.install(run.host())?, "installed"),
            Direction::Uninstall => (runtime.uninstall(run.host())?, "removed"),
        };

        if changed {
            ui.success(&format!("Runtime {} {}", name, verb));
        } else {
            ui.message(&format!("Runtime {} already {}", name, verb));
        }
        if self.direction == Direction::Install {
            let record = runtime.record(run.host())?;
            ui.show_field("ruby", &record.ruby_binary.display().to_string());
            ui.show_field("gem", &record.gem_binary.display().to_string());
        }
        Ok(CommandResult::success())
    }
}

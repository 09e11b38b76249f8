//! Exec command implementation.
//!
//! `rubyrig exec` runs one command under a runtime, or inside a bundle,
//! and exits with the command's status.

use crate::cli::args::{ExecArgs, TargetArgs};
use crate::error::Result;
use crate::runner::{ExecRequest, ProvisionRun, SystemHost};
use crate::ui::UserInterface;

use super::dispatcher::{
    inherited_path, resolve_platform, shell_executor, Command, CommandResult, Project,
};

/// The exec command implementation.
pub struct ExecCommand {
    project: Project,
    args: ExecArgs,
}

impl ExecCommand {
    /// Create a new exec command.
    pub fn new(project: Project, args: ExecArgs) -> Self {
        Self { project, args }
    }
}

/// Turn the shared target flags into a request.
pub(super) fn exec_request(target: &TargetArgs) -> ExecRequest {
    ExecRequest {
        runtime: target.runtime.clone(),
        bundle: target.bundle.clone(),
        environment: target.env.iter().cloned().collect(),
        directory: target.cwd.clone(),
        user: target.user.clone(),
    }
}

impl Command for ExecCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.load_for(ui, false)?;
        let platform = resolve_platform(&config)?;
        let system = SystemHost::new(platform, shell_executor(true));
        let run = ProvisionRun::new(&config, system.host(), self.project.root(), inherited_path())?;

        let plan = run.plan_command(&self.args.target.command_spec(), &exec_request(&self.args.target))?;
        ui.show_command(&plan.command.to_string());

        let output = run.host().exec.run(&plan)?;
        match output.exit_code {
            Some(0) => Ok(CommandResult::success()),
            Some(code) => Ok(CommandResult::failure(code)),
            None => {
                ui.error("Command was terminated by a signal");
                Ok(CommandResult::failure(1))
            }
        }
    }
}

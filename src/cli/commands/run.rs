//! Run command implementation.
//!
//! The `rubyrig run` command executes every configured step in order.

use crate::error::Result;
use crate::runner::{ProvisionRun, RunProgress, SystemHost};
use crate::ui::UserInterface;

use super::dispatcher::{
    inherited_path, resolve_platform, shell_executor, Command, CommandResult, Project,
};

/// The run command implementation.
pub struct RunCommand {
    project: Project,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project: Project) -> Self {
        Self { project }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.load_for(ui, true)?;
        if config.steps.is_empty() {
            ui.warning("No steps configured");
            return Ok(CommandResult::success());
        }

        let platform = resolve_platform(&config)?;
        ui.show_header(&format!("Provisioning on {}", platform));

        let system = SystemHost::new(platform, shell_executor(ui.output_mode().shows_commands()));
        let run = ProvisionRun::new(&config, system.host(), self.project.root(), inherited_path())?;

        let result = run.run(|progress| match progress {
            RunProgress::StepStarting { title, index, total } => {
                ui.show_step(index + 1, total, title)
            }
            RunProgress::StepFinished { title, changed } => ui.show_step_result(title, changed),
        })?;

        ui.success(&format!(
            "{} step(s) run, {} changed",
            result.steps.len(),
            result.changed_count()
        ));
        Ok(CommandResult::success())
    }
}

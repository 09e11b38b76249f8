//! Plan command implementation.
//!
//! `rubyrig plan` composes a command exactly as `exec` would and prints the
//! result instead of running it.

use anyhow::Context;

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::{ProvisionRun, SystemHost};
use crate::ui::UserInterface;

use super::dispatcher::{
    inherited_path, resolve_platform, shell_executor, Command, CommandResult, Project,
};
use super::exec::exec_request;

/// The plan command implementation.
pub struct PlanCommand {
    project: Project,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(project: Project, args: PlanArgs) -> Self {
        Self { project, args }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.load_for(ui, false)?;
        let platform = resolve_platform(&config)?;
        let system = SystemHost::new(platform, shell_executor(false));
        let run = ProvisionRun::new(&config, system.host(), self.project.root(), inherited_path())?;

        let target = &self.args.target;
        let plan = run.plan_command(&target.command_spec(), &exec_request(target))?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
            println!("{}", json);
            return Ok(CommandResult::success());
        }

        ui.show_field("command", &plan.command.to_string());
        ui.show_field("directory", &plan.directory.display().to_string());
        ui.show_field("user", plan.user.as_deref().unwrap_or("(current)"));
        for (key, value) in &plan.environment {
            ui.show_field(&format!("env {}", key), value);
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::TargetArgs;
    use crate::config::CONFIG_DIR;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plan_shows_composed_command() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.yml"),
            r#"
settings:
  platform: "debian:8"
  env:
    LANG: C.UTF-8
runtimes:
  default:
    provider: stub
    options:
      ruby_binary: /opt/ruby/bin/ruby
      ruby_environment:
        GEM_HOME: /opt/gems
"#,
        )
        .unwrap();

        let args = PlanArgs {
            json: false,
            target: TargetArgs {
                runtime: Some("default".into()),
                user: Some("root".into()),
                command: vec!["myapp.rb".into(), "--port".into(), "80".into()],
                ..TargetArgs::default()
            },
        };
        let cmd = PlanCommand::new(Project::new(temp.path().to_path_buf(), None), args);
        let mut ui = MockUI::new();
        cmd.execute(&mut ui).unwrap();

        assert_eq!(ui.field("command"), Some("/opt/ruby/bin/ruby myapp.rb --port 80"));
        assert_eq!(ui.field("directory"), Some("/"));
        assert_eq!(ui.field("user"), Some("root"));
        assert_eq!(ui.field("env GEM_HOME"), Some("/opt/gems"));
        assert_eq!(ui.field("env LANG"), Some("C.UTF-8"));
    }
}

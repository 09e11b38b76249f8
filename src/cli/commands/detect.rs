//! Detect command implementation.

use crate::error::Result;
use crate::runtime::ProviderSelector;
use crate::ui::UserInterface;

use super::dispatcher::{resolve_platform, Command, CommandResult, Project};

/// Shows the platform, as detected or configured, and the provider an
/// unconstrained runtime would get on it.
pub struct DetectCommand {
    project: Project,
}

impl DetectCommand {
    /// Create a new detect command.
    pub fn new(project: Project) -> Self {
        Self { project }
    }
}

impl Command for DetectCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.load_for(ui, false)?;
        let platform = resolve_platform(&config)?;
        let provider = ProviderSelector::new()
            .select(None, &platform, "")
            .map(|kind| kind.as_str())
            .unwrap_or("none");

        ui.show_field("family", platform.family.as_str());
        ui.show_field(
            "version",
            if platform.version.is_empty() {
                "unknown"
            } else {
                platform.version.as_str()
            },
        );
        ui.show_field("provider", provider);
        Ok(CommandResult::success())
    }
}

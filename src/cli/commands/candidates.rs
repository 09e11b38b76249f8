//! Candidates command implementation.
//!
//! `rubyrig candidates <version>` shows what each provider would consider
//! for a version request, without querying the package manager.

use anyhow::anyhow;

use crate::cli::args::CandidatesArgs;
use crate::config::ProviderOptions;
use crate::error::{Result, RigError};
use crate::platform::PlatformIdentity;
use crate::runtime::providers::collection::find_collection;
use crate::runtime::providers::NativePackage;
use crate::runtime::ProviderSelector;
use crate::ui::UserInterface;
use crate::version::candidate_names;

use super::dispatcher::{resolve_platform, Command, CommandResult, Project};

/// The candidates command implementation.
pub struct CandidatesCommand {
    project: Project,
    args: CandidatesArgs,
}

impl CandidatesCommand {
    /// Create a new candidates command.
    pub fn new(project: Project, args: CandidatesArgs) -> Self {
        Self { project, args }
    }

    fn platform(&self, ui: &mut dyn UserInterface) -> Result<PlatformIdentity> {
        match &self.args.platform {
            Some(value) => value.parse().map_err(|e: String| {
                RigError::Other(anyhow!("Invalid --platform '{}': {}", value, e))
            }),
            None => resolve_platform(&self.project.load_for(ui, false)?),
        }
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

impl Command for CandidatesCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let platform = self.platform(ui)?;
        let version = &self.args.version;

        let packages =
            NativePackage::new(version.as_str(), ProviderOptions::default()).candidate_packages(&platform);
        let collection = find_collection(version, &platform).map(|c| c.id.to_string());
        let provider = match ProviderSelector::new().select(None, &platform, version) {
            Ok(kind) => kind.as_str().to_string(),
            Err(e) => {
                tracing::debug!("{}", e);
                "none".to_string()
            }
        };

        ui.show_field("platform", &platform.to_string());
        ui.show_field("request", if version.is_empty() { "(any)" } else { version.as_str() });
        ui.show_field("names", &candidate_names(version).join(", "));
        ui.show_field("packages", &list_or_none(&packages));
        ui.show_field("collection", collection.as_deref().unwrap_or("none"));
        ui.show_field("provider", &provider);
        Ok(CommandResult::success())
    }
}

//! `rubyrig completions <shell>`.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Binary name the generated scripts complete for.
const BIN_NAME: &str = "rubyrig";

/// Prints a completion script for the whole CLI.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

/// Write the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        write_completions(self.args.shell, &mut lock);
        lock.flush()?;
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_covers_every_subcommand() {
        let output = script(Shell::Bash);
        for sub in [
            "run",
            "install",
            "uninstall",
            "exec",
            "plan",
            "candidates",
            "detect",
        ] {
            assert!(output.contains(sub), "missing {sub}");
        }
    }

    #[test]
    fn zsh_script_offers_target_options() {
        let output = script(Shell::Zsh);
        assert!(output.contains("--bundle"));
        assert!(output.contains("--runtime"));
        assert!(output.contains("--json"));
    }

    #[test]
    fn fish_script_offers_candidate_platform() {
        let output = script(Shell::Fish);
        assert!(output.contains("candidates"));
        assert!(output.contains("platform"));
    }
}

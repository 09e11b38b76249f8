//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::command::CommandSpec;

/// rubyrig - Ruby runtime and bundle provisioning.
#[derive(Debug, Parser)]
#[command(name = "rubyrig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .rubyrig/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every configured step (default if no command specified)
    Run,

    /// Install a configured runtime and its bundler
    Install(RuntimeArgs),

    /// Remove a configured runtime
    Uninstall(RuntimeArgs),

    /// Run a command under a runtime, optionally inside a bundle
    Exec(ExecArgs),

    /// Show how a command would be run, without running it
    Plan(PlanArgs),

    /// Show package and collection candidates for a Ruby version
    Candidates(CandidatesArgs),

    /// Show the detected platform and the provider it selects
    Detect,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments naming one runtime.
#[derive(Debug, Clone, clap::Args)]
pub struct RuntimeArgs {
    /// Runtime name from the config
    pub runtime: String,
}

/// Where and how an ad hoc command runs.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Runtime to run under
    #[arg(short, long)]
    pub runtime: Option<String>,

    /// Bundle to run inside (implies its runtime)
    #[arg(short, long)]
    pub bundle: Option<String>,

    /// Working directory (relative to the project root)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// User to run as (defaults to root when run as root, else the current user)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Extra environment as KEY=VALUE (repeatable)
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Command to run; a single word is treated as a shell line
    #[arg(last = true, required = true)]
    pub command: Vec<String>,
}

impl TargetArgs {
    /// The command as typed.
    pub fn command_spec(&self) -> CommandSpec {
        match self.command.as_slice() {
            [line] => CommandSpec::Shell(line.clone()),
            words => CommandSpec::Argv(words.to_vec()),
        }
    }
}

/// Arguments for the `exec` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ExecArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `candidates` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CandidatesArgs {
    /// Version request ("", "2", "2.3", "2.3.1")
    #[arg(id = "request", value_name = "VERSION", default_value = "")]
    pub version: String,

    /// Platform as family:version (defaults to the detected one)
    #[arg(long)]
    pub platform: Option<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["rubyrig"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn exec_collects_trailing_command() {
        let cli = Cli::try_parse_from([
            "rubyrig", "exec", "--bundle", "app", "-e", "RAILS_ENV=production", "--", "rake",
            "assets",
        ])
        .unwrap();
        let Some(Commands::Exec(args)) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(args.target.bundle.as_deref(), Some("app"));
        assert_eq!(
            args.target.env,
            vec![("RAILS_ENV".to_string(), "production".to_string())]
        );
        assert_eq!(
            args.target.command_spec(),
            CommandSpec::argv(["rake", "assets"])
        );
    }

    #[test]
    fn single_word_command_is_a_shell_line() {
        let cli = Cli::try_parse_from(["rubyrig", "plan", "--json", "--", "rake db:migrate"]).unwrap();
        let Some(Commands::Plan(args)) = cli.command else {
            panic!("expected plan");
        };
        assert!(args.json);
        assert_eq!(
            args.target.command_spec(),
            CommandSpec::Shell("rake db:migrate".into())
        );
    }

    #[test]
    fn exec_requires_a_command() {
        assert!(Cli::try_parse_from(["rubyrig", "exec", "--runtime", "default"]).is_err());
    }

    #[test]
    fn env_must_be_key_value() {
        assert!(parse_key_val("NOVALUE").is_err());
        assert!(parse_key_val("=x").is_err());
        assert_eq!(parse_key_val("A=b=c").unwrap(), ("A".into(), "b=c".into()));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rubyrig", "detect", "--debug", "-q"]).unwrap();
        assert!(cli.debug);
        assert!(cli.quiet);
    }
}

//! Command-line interface for rubyrig.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    CandidatesArgs, Cli, Commands, CompletionsArgs, ExecArgs, PlanArgs, RuntimeArgs, TargetArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult, Project};

//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations and shares config loading and
//! platform resolution between them.

pub mod candidates;
pub mod completions;
pub mod detect;
pub mod dispatcher;
pub mod exec;
pub mod install;
pub mod plan;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, Project};

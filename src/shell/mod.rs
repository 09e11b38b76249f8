//! Process execution on the real host and local account lookup.

pub mod command;
pub mod user;

pub use command::{OutputCallback, OutputLine, ShellExecutor};
pub use user::{default_directory, default_user, home_directory, Account, DEFAULT_USER};

//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for terminal usage
//! - [`MockUI`] capturing output for tests
//!
//! # Example
//!
//! ```
//! use rubyrig::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("rubyrig");
//! ui.success("Provisioning complete");
//! assert_eq!(ui.successes(), ["Provisioning complete"]);
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, RigTheme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode (e.g. from configuration).
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Announce step `current` of `total`.
    fn show_step(&mut self, current: usize, total: usize, title: &str);

    /// Report how a step ended.
    fn show_step_result(&mut self, title: &str, changed: bool);

    /// Show a `key: value` line.
    fn show_field(&mut self, key: &str, value: &str);

    /// Echo a command about to run.
    fn show_command(&mut self, command: &str);
}

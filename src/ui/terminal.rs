//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, OutputMode, RigTheme, UserInterface};

/// Terminal UI writing styled lines to stdout.
pub struct TerminalUI {
    term: Term,
    theme: RigTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI, coloured when stdout is a terminal.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            RigTheme::new()
        } else {
            RigTheme::plain()
        };
        Self::with_theme(mode, theme)
    }

    /// Create a terminal UI with an explicit theme.
    pub fn with_theme(mode: OutputMode, theme: RigTheme) -> Self {
        Self {
            term: Term::stdout(),
            theme,
            mode,
        }
    }

    fn line(&mut self, show: bool, text: String) {
        if show {
            writeln!(self.term, "{}", text).ok();
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.line(self.mode.shows_status(), msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        let text = self.theme.format_success(msg);
        self.line(self.mode.shows_status(), text);
    }

    fn warning(&mut self, msg: &str) {
        let text = self.theme.format_warning(msg);
        self.line(self.mode.shows_status(), text);
    }

    fn error(&mut self, msg: &str) {
        let text = self.theme.format_error(msg);
        writeln!(Term::stderr(), "{}", text).ok();
    }

    fn show_header(&mut self, title: &str) {
        let text = format!("\n{}\n", self.theme.format_header(title));
        self.line(self.mode.shows_progress(), text);
    }

    fn show_step(&mut self, current: usize, total: usize, title: &str) {
        let text = self.theme.format_step(current, total, title);
        self.line(self.mode.shows_progress(), text);
    }

    fn show_step_result(&mut self, title: &str, changed: bool) {
        let text = if changed {
            self.theme.format_success(&format!("{} (changed)", title))
        } else {
            self.theme.format_unchanged(&format!("{} (unchanged)", title))
        };
        self.line(self.mode.shows_progress(), text);
    }

    fn show_field(&mut self, key: &str, value: &str) {
        let text = self.theme.format_field(key, value);
        self.line(self.mode.shows_status(), text);
    }

    fn show_command(&mut self, command: &str) {
        let text = format!("  {}", self.theme.command.apply_to(format!("$ {}", command)));
        self.line(self.mode.shows_commands(), text);
    }
}

/// Create the UI for the CLI.
pub fn create_ui(mode: OutputMode, color: bool) -> Box<dyn UserInterface> {
    if color {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(TerminalUI::with_theme(mode, RigTheme::plain()))
    }
}

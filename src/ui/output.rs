//! Output verbosity.

use std::str::FromStr;

use crate::config::schema::OutputMode as ConfigOutputMode;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including composed commands.
    Verbose,
    /// Show step progress and status.
    #[default]
    Normal,
    /// Show final status only.
    Quiet,
    /// Show nothing except errors.
    Silent,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            "silent" => Ok(Self::Silent),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl From<ConfigOutputMode> for OutputMode {
    fn from(config_mode: ConfigOutputMode) -> Self {
        match config_mode {
            ConfigOutputMode::Verbose => Self::Verbose,
            ConfigOutputMode::Normal => Self::Normal,
            ConfigOutputMode::Quiet => Self::Quiet,
            ConfigOutputMode::Silent => Self::Silent,
        }
    }
}

impl OutputMode {
    /// Whether composed commands are echoed.
    pub fn shows_commands(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether per-step progress lines are shown.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Whether status messages are shown.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_from_str() {
        assert_eq!("verbose".parse::<OutputMode>(), Ok(OutputMode::Verbose));
        assert_eq!("QUIET".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert!("invalid".parse::<OutputMode>().is_err());
    }

    #[test]
    fn visibility_by_mode() {
        assert!(OutputMode::Verbose.shows_commands());
        assert!(!OutputMode::Normal.shows_commands());

        assert!(OutputMode::Normal.shows_progress());
        assert!(!OutputMode::Quiet.shows_progress());

        assert!(OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Silent.shows_status());
    }

    #[test]
    fn output_mode_default() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }

    #[test]
    fn from_config_covers_every_mode() {
        assert_eq!(OutputMode::from(ConfigOutputMode::Verbose), OutputMode::Verbose);
        assert_eq!(OutputMode::from(ConfigOutputMode::Normal), OutputMode::Normal);
        assert_eq!(OutputMode::from(ConfigOutputMode::Quiet), OutputMode::Quiet);
        assert_eq!(OutputMode::from(ConfigOutputMode::Silent), OutputMode::Silent);
    }
}

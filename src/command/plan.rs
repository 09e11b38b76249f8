//! Command shapes and execution plans.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A command as requested by the caller.
///
/// The shape is preserved end to end: a string stays a shell string, an
/// argument vector stays a vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    /// A shell command line.
    Shell(String),
    /// An explicit argument vector.
    Argv(Vec<String>),
}

impl CommandSpec {
    /// Build an argument vector command from anything string-like.
    pub fn argv<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Argv(args.into_iter().map(Into::into).collect())
    }

    /// Whether this is a shell string.
    pub fn is_shell(&self) -> bool {
        matches!(self, Self::Shell(_))
    }

    /// First word of the command, if any.
    pub fn program(&self) -> Option<String> {
        match self {
            Self::Shell(s) => shlex::split(s).and_then(|words| words.into_iter().next()),
            Self::Argv(args) => args.first().cloned(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell(s) => f.write_str(s),
            Self::Argv(args) => {
                let joined = shlex::try_join(args.iter().map(String::as_str))
                    .unwrap_or_else(|_| args.join(" "));
                f.write_str(&joined)
            }
        }
    }
}

impl From<&str> for CommandSpec {
    fn from(s: &str) -> Self {
        Self::Shell(s.to_string())
    }
}

impl From<Vec<String>> for CommandSpec {
    fn from(args: Vec<String>) -> Self {
        Self::Argv(args)
    }
}

/// Everything needed to run one command under a runtime.
///
/// Created fresh for every composition and discarded after execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    /// The final command, same shape as the request.
    pub command: CommandSpec,
    /// Environment variables to add on top of the inherited environment.
    pub environment: BTreeMap<String, String>,
    /// Working directory.
    pub directory: PathBuf,
    /// User to run as (`None` = current user).
    pub user: Option<String>,
}

impl ExecutionPlan {
    /// A plan with no extra environment, run in `/` as the current user.
    pub fn new(command: CommandSpec) -> Self {
        Self {
            command,
            environment: BTreeMap::new(),
            directory: PathBuf::from("/"),
            user: None,
        }
    }

    /// Set the environment.
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Set the working directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Set the user.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }
}

//! Process execution port.

use crate::command::ExecutionPlan;
use crate::error::{RigError, Result};

/// Output of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl ExecOutput {
    /// A successful run with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed run with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs execution plans.
pub trait Executor {
    /// Run a plan to completion and capture its output.
    ///
    /// A non-zero exit is not an error at this level; see [`run_checked`].
    fn run(&self, plan: &ExecutionPlan) -> Result<ExecOutput>;
}

/// Run a plan and fail with `CommandFailed` on a non-zero exit.
pub fn run_checked(exec: &dyn Executor, plan: &ExecutionPlan) -> Result<ExecOutput> {
    let output = exec.run(plan)?;
    if output.success() {
        Ok(output)
    } else {
        Err(RigError::CommandFailed {
            command: plan.command.to_string(),
            code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandSpec;
    use crate::ports::fake::FakeExecutor;

    #[test]
    fn run_checked_passes_success_through() {
        let exec = FakeExecutor::new();
        exec.respond("echo", ExecOutput::ok("hi\n"));
        let plan = ExecutionPlan::new(CommandSpec::argv(["echo", "hi"]));
        let output = run_checked(&exec, &plan).unwrap();
        assert_eq!(output.stdout, "hi\n");
    }

    #[test]
    fn run_checked_turns_failure_into_error() {
        let exec = FakeExecutor::new();
        exec.respond("false", ExecOutput::failed(1, "nope"));
        let plan = ExecutionPlan::new(CommandSpec::argv(["false"]));
        let err = run_checked(&exec, &plan).unwrap_err();
        match err {
            RigError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

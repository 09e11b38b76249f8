//! Process execution for the real host.

use crate::command::{CommandSpec, ExecutionPlan};
use crate::error::{RigError, Result};
use crate::ports::exec::{ExecOutput, Executor};
use crate::shell::user;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

/// Output line from command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Callback for streaming output.
pub type OutputCallback = Arc<dyn Fn(OutputLine) + Send + Sync>;

/// Runs plans as child processes.
///
/// Argument vectors are executed directly; shell strings go through
/// `/bin/sh -c`. With a callback set, output lines are forwarded as they
/// arrive and still captured in full.
#[derive(Clone, Default)]
pub struct ShellExecutor {
    on_output: Option<OutputCallback>,
}

impl fmt::Debug for ShellExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellExecutor")
            .field("streaming", &self.on_output.is_some())
            .finish()
    }
}

impl ShellExecutor {
    /// An executor that captures output silently.
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor that also forwards each output line to `callback`.
    pub fn streaming(callback: OutputCallback) -> Self {
        Self {
            on_output: Some(callback),
        }
    }

    fn build(&self, plan: &ExecutionPlan) -> Result<Command> {
        let mut cmd = match &plan.command {
            CommandSpec::Shell(line) => {
                let mut cmd = Command::new("/bin/sh");
                cmd.arg("-c").arg(line);
                cmd
            }
            CommandSpec::Argv(args) => {
                let (program, rest) = args.split_first().ok_or_else(|| RigError::CommandFailed {
                    command: String::new(),
                    code: None,
                    stderr: "empty command".to_string(),
                })?;
                let mut cmd = Command::new(program);
                cmd.args(rest);
                cmd
            }
        };

        cmd.current_dir(&plan.directory);
        if let Some(name) = &plan.user {
            switch_user(&mut cmd, name, plan)?;
        }
        cmd.envs(&plan.environment);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        Ok(cmd)
    }
}

/// Run the child as another account, setting its identity variables.
#[cfg(unix)]
fn switch_user(cmd: &mut Command, name: &str, plan: &ExecutionPlan) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let account = user::lookup(name).ok_or_else(|| RigError::CommandFailed {
        command: plan.command.to_string(),
        code: None,
        stderr: format!("unknown user '{}'", name),
    })?;
    if user::current_uid() != Some(account.uid) {
        cmd.uid(account.uid).gid(account.gid);
    }
    cmd.env("HOME", &account.home);
    cmd.env("USER", &account.name);
    cmd.env("LOGNAME", &account.name);
    Ok(())
}

#[cfg(not(unix))]
fn switch_user(_cmd: &mut Command, name: &str, _plan: &ExecutionPlan) -> Result<()> {
    tracing::warn!("Ignoring user {} on this platform", name);
    Ok(())
}

fn spawn_failed(plan: &ExecutionPlan, e: std::io::Error) -> RigError {
    RigError::CommandFailed {
        command: plan.command.to_string(),
        code: None,
        stderr: e.to_string(),
    }
}

impl Executor for ShellExecutor {
    fn run(&self, plan: &ExecutionPlan) -> Result<ExecOutput> {
        let start = Instant::now();
        let mut cmd = self.build(plan)?;
        tracing::debug!(
            "Running `{}` in {} as {}",
            plan.command,
            plan.directory.display(),
            plan.user.as_deref().unwrap_or("current user")
        );

        let output = match &self.on_output {
            None => {
                let output = cmd.output().map_err(|e| spawn_failed(plan, e))?;
                ExecOutput {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                }
            }
            Some(callback) => run_streaming(&mut cmd, plan, callback)?,
        };

        tracing::debug!(
            "`{}` exited with {:?} after {:?}",
            plan.command,
            output.exit_code,
            start.elapsed()
        );
        Ok(output)
    }
}

fn run_streaming(
    cmd: &mut Command,
    plan: &ExecutionPlan,
    callback: &OutputCallback,
) -> Result<ExecOutput> {
    let mut child = cmd.spawn().map_err(|e| spawn_failed(plan, e))?;

    let missing = || spawn_failed(plan, std::io::Error::other("child pipes unavailable"));
    let stdout = child.stdout.take().ok_or_else(missing)?;
    let stderr = child.stderr.take().ok_or_else(missing)?;

    let (tx, rx) = mpsc::channel();
    let tx_stdout = tx.clone();
    let tx_stderr = tx;

    let stdout_handle = thread::spawn(move || {
        let reader = BufReader::new(stdout);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stdout.send(OutputLine::Stdout(line));
        }
        output
    });

    let stderr_handle = thread::spawn(move || {
        let reader = BufReader::new(stderr);
        let mut output = String::new();
        for line in reader.lines().map_while(std::result::Result::ok) {
            output.push_str(&line);
            output.push('\n');
            let _ = tx_stderr.send(OutputLine::Stderr(line));
        }
        output
    });

    for line in rx {
        callback(line);
    }

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    let status = child.wait().map_err(|e| spawn_failed(plan, e))?;

    Ok(ExecOutput {
        exit_code: status.code(),
        stdout,
        stderr,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[test]
    fn runs_argv_directly() {
        let plan = ExecutionPlan::new(CommandSpec::argv(["echo", "hello world"]));
        let output = ShellExecutor::new().run(&plan).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout, "hello world\n");
    }

    #[test]
    fn runs_strings_through_shell() {
        let plan = ExecutionPlan::new(CommandSpec::from("echo one && echo two"));
        let output = ShellExecutor::new().run(&plan).unwrap();
        assert_eq!(output.stdout, "one\ntwo\n");
    }

    #[test]
    fn failing_command_is_not_an_error() {
        let plan = ExecutionPlan::new(CommandSpec::from("exit 3"));
        let output = ShellExecutor::new().run(&plan).unwrap();
        assert_eq!(output.exit_code, Some(3));
    }

    #[test]
    fn missing_program_is_an_error() {
        let plan = ExecutionPlan::new(CommandSpec::argv(["/nonexistent/rubyrig-test-binary"]));
        assert!(matches!(
            ShellExecutor::new().run(&plan),
            Err(RigError::CommandFailed { code: None, .. })
        ));
    }

    #[test]
    fn empty_argv_is_an_error() {
        let plan = ExecutionPlan::new(CommandSpec::Argv(vec![]));
        assert!(ShellExecutor::new().run(&plan).is_err());
    }

    #[test]
    fn applies_environment_and_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut env = BTreeMap::new();
        env.insert("RUBYRIG_TEST_VAR".to_string(), "value".to_string());
        let plan = ExecutionPlan::new(CommandSpec::from("echo $RUBYRIG_TEST_VAR; pwd"))
            .with_environment(env)
            .with_directory(temp.path());

        let output = ShellExecutor::new().run(&plan).unwrap();
        let mut lines = output.stdout.lines();
        assert_eq!(lines.next(), Some("value"));
        let pwd = std::path::PathBuf::from(lines.next().unwrap());
        assert_eq!(
            pwd.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn streaming_forwards_and_captures() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let exec = ShellExecutor::streaming(Arc::new(move |line| {
            sink.lock().unwrap().push(line);
        }));

        let plan = ExecutionPlan::new(CommandSpec::from("echo out; echo err >&2"));
        let output = exec.run(&plan).unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        let seen = lines.lock().unwrap();
        assert!(seen.contains(&OutputLine::Stdout("out".to_string())));
        assert!(seen.contains(&OutputLine::Stderr("err".to_string())));
    }

    #[test]
    fn unknown_user_is_an_error() {
        let plan = ExecutionPlan::new(CommandSpec::argv(["true"]))
            .with_user(Some("no-such-user-rubyrig".to_string()));
        assert!(ShellExecutor::new().run(&plan).is_err());
    }
}

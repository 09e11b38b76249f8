//! Software collection environment port.
//!
//! Software Collections install a runtime under `/opt/rh/<id>` and ship an
//! `enable` script that exports the variables needed to use it. The core
//! only needs the resulting variables.

use crate::command::{CommandSpec, ExecutionPlan};
use crate::error::Result;
use crate::ports::exec::{run_checked, Executor};
use crate::shell::ShellExecutor;
use std::collections::BTreeMap;

/// Root under which collections are installed.
pub const COLLECTION_ROOT: &str = "/opt/rh";

/// Environment variables a collection needs.
pub trait CollectionEnvironment {
    /// Variables that differ from the base environment after enabling.
    fn environment(&self, collection: &str) -> Result<BTreeMap<String, String>>;
}

/// Sources the collection's `enable` script in bash and diffs `env`.
pub struct SclEnvironment<E: Executor = ShellExecutor> {
    exec: E,
}

impl SclEnvironment<ShellExecutor> {
    /// Collection environment using the real shell.
    pub fn new() -> Self {
        Self::with_executor(ShellExecutor::default())
    }
}

impl Default for SclEnvironment<ShellExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Executor> SclEnvironment<E> {
    /// Collection environment using a custom executor.
    pub fn with_executor(exec: E) -> Self {
        Self { exec }
    }

    /// The executor commands are sent to.
    pub fn executor(&self) -> &E {
        &self.exec
    }

    fn dump(&self, script: &str) -> Result<BTreeMap<String, String>> {
        let plan = ExecutionPlan::new(CommandSpec::argv(["bash", "-c", script]));
        let output = run_checked(&self.exec, &plan)?;
        Ok(parse_env(&output.stdout))
    }
}

impl<E: Executor> CollectionEnvironment for SclEnvironment<E> {
    fn environment(&self, collection: &str) -> Result<BTreeMap<String, String>> {
        let base = self.dump("env")?;
        let enabled = self.dump(&format!(
            "source {}/{}/enable && env",
            COLLECTION_ROOT, collection
        ))?;
        let diff: BTreeMap<String, String> = enabled
            .into_iter()
            .filter(|(key, value)| base.get(key) != Some(value))
            .collect();
        tracing::debug!(
            "Collection {} sets {} variable(s)",
            collection,
            diff.len()
        );
        Ok(diff)
    }
}

/// Parse `KEY=value` lines; lines without `=` continue the previous value.
fn parse_env(output: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut last: Option<String> = None;
    for line in output.lines() {
        match line.split_once('=') {
            Some((key, value)) if !key.is_empty() && !key.contains(char::is_whitespace) => {
                vars.insert(key.to_string(), value.to_string());
                last = Some(key.to_string());
            }
            _ => {
                if let Some(value) = last.as_ref().and_then(|k| vars.get_mut(k)) {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::exec::ExecOutput;
    use crate::ports::fake::FakeExecutor;

    #[test]
    fn parse_env_handles_multiline_values() {
        let vars = parse_env("A=1\nB=two\nlines\nC=x=y\n");
        assert_eq!(vars["A"], "1");
        assert_eq!(vars["B"], "two\nlines");
        assert_eq!(vars["C"], "x=y");
    }

    #[test]
    fn environment_is_the_difference() {
        let scl = SclEnvironment::with_executor(FakeExecutor::new());
        scl.executor()
            .respond("bash -c env", ExecOutput::ok("PATH=/usr/bin\nHOME=/root\n"));
        scl.executor().respond(
            "bash -c source /opt/rh/rh-ruby22/enable",
            ExecOutput::ok(
                "PATH=/opt/rh/rh-ruby22/root/usr/bin:/usr/bin\nHOME=/root\nX_SCLS=rh-ruby22 \n",
            ),
        );

        let env = scl.environment("rh-ruby22").unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env["PATH"], "/opt/rh/rh-ruby22/root/usr/bin:/usr/bin");
        assert_eq!(env["X_SCLS"], "rh-ruby22 ");
        assert!(!env.contains_key("HOME"));
    }

    #[test]
    fn missing_enable_script_is_an_error() {
        let scl = SclEnvironment::with_executor(FakeExecutor::new());
        scl.executor().respond(
            "bash -c source",
            ExecOutput::failed(1, "No such file or directory"),
        );
        assert!(scl.environment("ruby193").is_err());
    }
}

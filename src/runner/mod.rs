//! Provisioning runs against a host.

pub mod host;
pub mod provision;

pub use host::SystemHost;
pub use provision::{ExecRequest, ProvisionRun, RunProgress, RunResult, StepOutcome};

//! Command composition for runtimes and bundles.
//!
//! - [`plan`] - command shapes and the [`ExecutionPlan`] value
//! - [`lookup`] - executable search on a `PATH`-style string
//! - [`composer`] - [`CommandComposer`], which turns a request into a plan

pub mod composer;
pub mod lookup;
pub mod plan;

pub use composer::{leading_binaries, CommandComposer};
pub use lookup::{find_executable, prepend_search_path, resolve_program, PATH_SEPARATOR};
pub use plan::{CommandSpec, ExecutionPlan};

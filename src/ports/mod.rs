//! Narrow interfaces to the collaborators the core calls into.
//!
//! - [`packages`] - OS package queries and install/remove actions
//! - [`exec`] - process execution
//! - [`fs`] - directory listing and file checks
//! - [`collection`] - software collection environments
//! - [`fake`] - in-memory doubles for all of the above
//!
//! [`Host`] bundles one of each so resolution code can take a single
//! borrowed handle.

pub mod collection;
pub mod exec;
pub mod fake;
pub mod fs;
pub mod packages;

pub use collection::{CollectionEnvironment, SclEnvironment};
pub use exec::{ExecOutput, Executor};
pub use fs::{expand_path, Filesystem, OsFilesystem};
pub use packages::{PackageAction, PackageQuery, SystemPackages};

use crate::platform::PlatformIdentity;

/// Borrowed collaborators for one provisioning run.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub platform: &'a PlatformIdentity,
    pub packages: &'a dyn PackageQuery,
    pub exec: &'a dyn Executor,
    pub fs: &'a dyn Filesystem,
    pub collections: &'a dyn CollectionEnvironment,
}

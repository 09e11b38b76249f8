//! The real collaborators, owned for the length of a run.

use crate::platform::PlatformIdentity;
use crate::ports::{Host, OsFilesystem, SclEnvironment, SystemPackages};
use crate::shell::ShellExecutor;

/// Package manager, shell, filesystem and collection environment for the
/// machine this process runs on.
pub struct SystemHost {
    platform: PlatformIdentity,
    packages: SystemPackages,
    exec: ShellExecutor,
    fs: OsFilesystem,
    collections: SclEnvironment,
}

impl SystemHost {
    /// Wire every port to `exec`.
    pub fn new(platform: PlatformIdentity, exec: ShellExecutor) -> Self {
        Self {
            packages: SystemPackages::with_executor(platform.family, exec.clone()),
            collections: SclEnvironment::with_executor(exec.clone()),
            fs: OsFilesystem,
            exec,
            platform,
        }
    }

    pub fn platform(&self) -> &PlatformIdentity {
        &self.platform
    }

    /// Borrow everything as a [`Host`].
    pub fn host(&self) -> Host<'_> {
        Host {
            platform: &self.platform,
            packages: &self.packages,
            exec: &self.exec,
            fs: &self.fs,
            collections: &self.collections,
        }
    }
}

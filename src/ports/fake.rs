//! In-memory test doubles for every port.
//!
//! These let resolution and composition run without touching the package
//! manager, spawning processes, or needing a prepared directory tree.
//!
//! # Example
//!
//! ```
//! use rubyrig::ports::fake::FakePackages;
//! use rubyrig::ports::{PackageAction, PackageQuery};
//!
//! let packages = FakePackages::new().with_candidate("ruby2.1", "2.1.5-2");
//! assert!(packages.apply("ruby2.1", None, PackageAction::Install).unwrap());
//! assert!(!packages.apply("ruby2.1", None, PackageAction::Install).unwrap());
//! ```

use crate::command::{CommandSpec, ExecutionPlan};
use crate::error::Result;
use crate::platform::PlatformIdentity;
use crate::ports::collection::CollectionEnvironment;
use crate::ports::exec::{ExecOutput, Executor};
use crate::ports::fs::Filesystem;
use crate::ports::packages::{PackageAction, PackageQuery};
use crate::ports::Host;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A package action that actually changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAction {
    pub package: String,
    pub version: Option<String>,
    pub action: PackageAction,
}

/// Package manager backed by two maps: candidates and installed versions.
#[derive(Debug, Default)]
pub struct FakePackages {
    candidates: HashMap<String, String>,
    installed: RefCell<HashMap<String, String>>,
    applied: RefCell<Vec<AppliedAction>>,
    queries: RefCell<Vec<String>>,
}

impl FakePackages {
    /// An empty package universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a package installable at the given version.
    pub fn with_candidate(mut self, package: &str, version: &str) -> Self {
        self.candidates
            .insert(package.to_string(), version.to_string());
        self
    }

    /// Mark a package as already installed.
    pub fn with_installed(self, package: &str, version: &str) -> Self {
        self.installed
            .borrow_mut()
            .insert(package.to_string(), version.to_string());
        self
    }

    /// Installed version of a package.
    pub fn installed(&self, package: &str) -> Option<String> {
        self.installed.borrow().get(package).cloned()
    }

    /// Actions that changed state, in order.
    pub fn applied(&self) -> Vec<AppliedAction> {
        self.applied.borrow().clone()
    }

    /// Package names whose candidate version was queried, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }
}

impl PackageQuery for FakePackages {
    fn candidate_version(&self, package: &str) -> Result<Option<String>> {
        self.queries.borrow_mut().push(package.to_string());
        Ok(self.candidates.get(package).cloned())
    }

    fn apply(&self, package: &str, version: Option<&str>, action: PackageAction) -> Result<bool> {
        let current = self.installed(package);
        let changed = match action {
            PackageAction::Install | PackageAction::Upgrade => {
                let wanted = version
                    .map(str::to_string)
                    .or_else(|| self.candidates.get(package).cloned())
                    .unwrap_or_default();
                let satisfied = match (&current, action) {
                    (None, _) => false,
                    (Some(_), PackageAction::Install) if version.is_none() => true,
                    (Some(have), _) => *have == wanted,
                };
                if !satisfied {
                    self.installed
                        .borrow_mut()
                        .insert(package.to_string(), wanted);
                }
                !satisfied
            }
            PackageAction::Remove | PackageAction::Purge => {
                self.installed.borrow_mut().remove(package).is_some()
            }
        };
        if changed {
            self.applied.borrow_mut().push(AppliedAction {
                package: package.to_string(),
                version: version.map(str::to_string),
                action,
            });
        }
        Ok(changed)
    }
}

/// Executor that records plans and replies with scripted output.
///
/// Responses are keyed by a prefix of the rendered command line (argv
/// words joined by single spaces). The most recently registered matching
/// prefix wins; unmatched commands succeed with empty output.
#[derive(Debug, Default)]
pub struct FakeExecutor {
    responses: RefCell<Vec<(String, ExecOutput)>>,
    plans: RefCell<Vec<ExecutionPlan>>,
}

impl FakeExecutor {
    /// An executor with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `output` to commands starting with `prefix`.
    pub fn respond(&self, prefix: &str, output: ExecOutput) {
        self.responses
            .borrow_mut()
            .push((prefix.to_string(), output));
    }

    /// Every plan run so far.
    pub fn plans(&self) -> Vec<ExecutionPlan> {
        self.plans.borrow().clone()
    }

    /// The most recent plan.
    pub fn last_plan(&self) -> Option<ExecutionPlan> {
        self.plans.borrow().last().cloned()
    }

    /// Rendered command lines, in order.
    pub fn commands(&self) -> Vec<String> {
        self.plans
            .borrow()
            .iter()
            .map(|p| render(&p.command))
            .collect()
    }

    /// Whether any command line contained `needle`.
    pub fn ran(&self, needle: &str) -> bool {
        self.commands().iter().any(|c| c.contains(needle))
    }
}

fn render(command: &CommandSpec) -> String {
    match command {
        CommandSpec::Shell(s) => s.clone(),
        CommandSpec::Argv(args) => args.join(" "),
    }
}

impl Executor for FakeExecutor {
    fn run(&self, plan: &ExecutionPlan) -> Result<ExecOutput> {
        self.plans.borrow_mut().push(plan.clone());
        let line = render(&plan.command);
        let output = self
            .responses
            .borrow()
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ExecOutput::ok(""));
        Ok(output)
    }
}

/// Filesystem made of a set of file paths.
///
/// Every ancestor of a registered file is a directory.
#[derive(Debug, Default, Clone)]
pub struct FakeFilesystem {
    files: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
}

impl FakeFilesystem {
    /// An empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path);
        self
    }

    /// Add an executable file.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path.clone());
        self.executables.insert(path);
        self
    }

    /// Add an (empty) directory.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path);
        self
    }

    /// Add a directory that exists but cannot be listed.
    pub fn with_unreadable_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path.clone());
        self.unreadable.insert(path);
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

impl Filesystem for FakeFilesystem {
    fn read_dir(&self, dir: &Path) -> Result<Vec<String>> {
        if !self.dirs.contains(dir) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: no such directory", dir.display()),
            )
            .into());
        }
        if self.unreadable.contains(dir) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{}: permission denied", dir.display()),
            )
            .into());
        }
        let names: BTreeSet<String> = self
            .files
            .iter()
            .chain(self.dirs.iter())
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn is_executable(&self, path: &Path) -> bool {
        self.executables.contains(path)
    }
}

/// Collection environments from a fixed table.
#[derive(Debug, Default)]
pub struct FakeCollections {
    environments: HashMap<String, BTreeMap<String, String>>,
    requested: RefCell<Vec<String>>,
}

impl FakeCollections {
    /// No collections have any environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment for one collection.
    pub fn with_environment(mut self, collection: &str, vars: &[(&str, &str)]) -> Self {
        self.environments.insert(
            collection.to_string(),
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    /// Collections whose environment was requested, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl CollectionEnvironment for FakeCollections {
    fn environment(&self, collection: &str) -> Result<BTreeMap<String, String>> {
        self.requested.borrow_mut().push(collection.to_string());
        Ok(self
            .environments
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }
}

/// One fake of each port plus a platform, lending out a [`Host`].
#[derive(Debug)]
pub struct FakeHost {
    pub platform: PlatformIdentity,
    pub packages: FakePackages,
    pub exec: FakeExecutor,
    pub fs: FakeFilesystem,
    pub collections: FakeCollections,
}

impl FakeHost {
    /// Empty fakes for the given platform.
    pub fn new(platform: PlatformIdentity) -> Self {
        Self {
            platform,
            packages: FakePackages::new(),
            exec: FakeExecutor::new(),
            fs: FakeFilesystem::new(),
            collections: FakeCollections::new(),
        }
    }

    /// Replace the package fake.
    pub fn with_packages(mut self, packages: FakePackages) -> Self {
        self.packages = packages;
        self
    }

    /// Replace the filesystem fake.
    pub fn with_fs(mut self, fs: FakeFilesystem) -> Self {
        self.fs = fs;
        self
    }

    /// Replace the collection fake.
    pub fn with_collections(mut self, collections: FakeCollections) -> Self {
        self.collections = collections;
        self
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_packages_tracks_install_state() {
        let packages = FakePackages::new().with_candidate("ruby", "2.0.0");
        assert_eq!(packages.candidate_version("ruby").unwrap().as_deref(), Some("2.0.0"));
        assert!(packages.apply("ruby", None, PackageAction::Install).unwrap());
        assert_eq!(packages.installed("ruby").as_deref(), Some("2.0.0"));
        assert!(!packages.apply("ruby", None, PackageAction::Install).unwrap());
        assert!(packages.apply("ruby", None, PackageAction::Remove).unwrap());
        assert!(!packages.apply("ruby", None, PackageAction::Remove).unwrap());
        assert_eq!(packages.applied().len(), 2);
    }

    #[test]
    fn fake_packages_upgrade_to_candidate() {
        let packages = FakePackages::new()
            .with_candidate("ruby", "2.0.1")
            .with_installed("ruby", "2.0.0");
        assert!(packages.apply("ruby", None, PackageAction::Upgrade).unwrap());
        assert!(!packages.apply("ruby", None, PackageAction::Upgrade).unwrap());
    }

    #[test]
    fn fake_executor_prefers_latest_response() {
        let exec = FakeExecutor::new();
        exec.respond("gem", ExecOutput::ok("first"));
        exec.respond("gem list", ExecOutput::ok("second"));
        let out = exec
            .run(&ExecutionPlan::new(CommandSpec::argv(["gem", "list"])))
            .unwrap();
        assert_eq!(out.stdout, "second");
        assert!(exec.ran("gem list"));
    }

    #[test]
    fn fake_filesystem_lists_children() {
        let fs = FakeFilesystem::new()
            .with_file("/srv/app/Gemfile")
            .with_dir("/srv/app/vendor/bundle/ruby/2.4.0/bin");
        assert_eq!(fs.read_dir(Path::new("/srv/app")).unwrap(), vec!["Gemfile", "vendor"]);
        assert!(fs.is_dir(Path::new("/srv/app/vendor/bundle/ruby")));
        assert!(fs.is_file(Path::new("/srv/app/Gemfile")));
        assert!(fs.read_dir(Path::new("/nowhere")).is_err());
    }
}

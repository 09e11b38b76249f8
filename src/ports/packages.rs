//! OS package port.
//!
//! [`PackageQuery`] is the only way the core touches the system package
//! manager. An absent candidate version means "not available", which is a
//! normal answer and never an error.
//!
//! [`SystemPackages`] implements it on top of an [`Executor`] using apt on
//! Debian-like systems and yum/rpm elsewhere.

use crate::command::{CommandSpec, ExecutionPlan};
use crate::error::{RigError, Result};
use crate::platform::PlatformFamily;
use crate::ports::exec::{run_checked, Executor};
use crate::shell::ShellExecutor;
use crate::version::strip_epoch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What to do with a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    #[default]
    Install,
    Upgrade,
    Remove,
    Purge,
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Remove => "remove",
            Self::Purge => "purge",
        })
    }
}

/// Query and change OS packages.
pub trait PackageQuery {
    /// Best version the package manager would install, if any.
    fn candidate_version(&self, package: &str) -> Result<Option<String>>;

    /// Apply an action, returning whether anything changed.
    fn apply(&self, package: &str, version: Option<&str>, action: PackageAction) -> Result<bool>;
}

/// apt or yum, driven through an executor.
pub struct SystemPackages<E: Executor = ShellExecutor> {
    family: PlatformFamily,
    exec: E,
}

impl SystemPackages<ShellExecutor> {
    /// Package manager for the given family using the real shell.
    pub fn new(family: PlatformFamily) -> Self {
        Self::with_executor(family, ShellExecutor::default())
    }
}

impl<E: Executor> SystemPackages<E> {
    /// Package manager for the given family using a custom executor.
    pub fn with_executor(family: PlatformFamily, exec: E) -> Self {
        Self { family, exec }
    }

    /// The executor commands are sent to.
    pub fn executor(&self) -> &E {
        &self.exec
    }

    fn plan(&self, args: &[&str]) -> ExecutionPlan {
        let mut env = BTreeMap::new();
        if self.family.is_debian_like() {
            env.insert("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string());
        }
        ExecutionPlan::new(CommandSpec::argv(args.iter().copied())).with_environment(env)
    }

    fn query(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.exec.run(&self.plan(args))?;
        Ok(output.success().then_some(output.stdout))
    }

    fn installed_version(&self, package: &str) -> Result<Option<String>> {
        if self.family.is_debian_like() {
            let status = self.query(&["dpkg-query", "-W", "-f=${Status} ${Version}", package])?;
            Ok(status.and_then(|s| parse_dpkg_status(&s)))
        } else {
            let version = self.query(&["rpm", "-q", "--qf", "%{VERSION}-%{RELEASE}", package])?;
            Ok(version.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
        }
    }

    fn run_manager(&self, action: PackageAction, package: &str, version: Option<&str>) -> Result<()> {
        let target = match (version, self.family.is_debian_like()) {
            (Some(v), true) => format!("{}={}", package, v),
            (Some(v), false) => format!("{}-{}", package, v),
            (None, _) => package.to_string(),
        };
        let args: Vec<&str> = if self.family.is_debian_like() {
            let verb = match action {
                PackageAction::Install | PackageAction::Upgrade => "install",
                PackageAction::Remove => "remove",
                PackageAction::Purge => "purge",
            };
            vec!["apt-get", "-q", "-y", verb, &target]
        } else {
            let verb = match action {
                PackageAction::Install | PackageAction::Upgrade => "install",
                PackageAction::Remove | PackageAction::Purge => "remove",
            };
            vec!["yum", "-q", "-y", verb, &target]
        };
        tracing::info!("Running {} for package {}", action, target);
        run_checked(&self.exec, &self.plan(&args))?;
        Ok(())
    }
}

impl<E: Executor> PackageQuery for SystemPackages<E> {
    fn candidate_version(&self, package: &str) -> Result<Option<String>> {
        if !self.family.is_debian_like() && !self.family.is_rpm_based() {
            return Err(RigError::PackageQueryFailed {
                package: package.to_string(),
                message: format!("no package manager known for {}", self.family),
            });
        }
        let version = if self.family.is_debian_like() {
            self.query(&["apt-cache", "policy", package])?
                .and_then(|out| parse_apt_candidate(&out))
        } else {
            self.query(&["yum", "-q", "info", package])?
                .and_then(|out| parse_yum_version(&out))
        };
        tracing::debug!("Candidate version for {}: {:?}", package, version);
        Ok(version)
    }

    fn apply(&self, package: &str, version: Option<&str>, action: PackageAction) -> Result<bool> {
        let installed = self.installed_version(package)?;
        let needed = match action {
            PackageAction::Install => match (&installed, version) {
                (None, _) => true,
                (Some(current), Some(wanted)) => !same_version(current, wanted),
                (Some(_), None) => false,
            },
            PackageAction::Upgrade => {
                let wanted = match version {
                    Some(v) => Some(v.to_string()),
                    None => self.candidate_version(package)?,
                };
                match (&installed, wanted) {
                    (None, _) => true,
                    (Some(current), Some(wanted)) => !same_version(current, &wanted),
                    (Some(_), None) => false,
                }
            }
            PackageAction::Remove | PackageAction::Purge => installed.is_some(),
        };

        if !needed {
            tracing::debug!("Package {} already satisfies {}", package, action);
            return Ok(false);
        }
        self.run_manager(action, package, version)?;
        Ok(true)
    }
}

/// rpm queries omit the epoch that yum reports, so compare without it.
fn same_version(installed: &str, wanted: &str) -> bool {
    strip_epoch(installed) == strip_epoch(wanted)
}

/// Extract the `Candidate:` line from `apt-cache policy` output.
fn parse_apt_candidate(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("Candidate:"))
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "(none)")
        .map(str::to_string)
}

/// Extract `[epoch:]version-release` of the last package block in `yum info`.
fn parse_yum_version(output: &str) -> Option<String> {
    let mut epoch = None;
    let mut version = None;
    let mut release = None;
    let mut result = None;

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Name" => {
                epoch = None;
                version = None;
                release = None;
            }
            "Epoch" => epoch = Some(value),
            "Version" => version = Some(value),
            "Release" => release = Some(value),
            _ => continue,
        }
        if let (Some(v), Some(r)) = (&version, &release) {
            result = Some(match epoch.as_deref() {
                Some(e) if e != "0" => format!("{}:{}-{}", e, v, r),
                _ => format!("{}-{}", v, r),
            });
        }
    }
    result
}

/// Version from a `dpkg-query -f '${Status} ${Version}'` line, if installed.
fn parse_dpkg_status(output: &str) -> Option<String> {
    output
        .trim()
        .strip_prefix("install ok installed ")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

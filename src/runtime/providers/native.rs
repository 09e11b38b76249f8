//! Ruby from distribution packages.
//!
//! Candidate names come from [`candidate_names`] filtered through a
//! per-distribution table of packages known to exist. Each surviving
//! candidate is queried in order and the first whose installable version
//! satisfies the request is used.

use crate::config::{ProviderOptions, Toggle};
use crate::error::{RejectedCandidate, RigError, Result};
use crate::platform::{PlatformFamily, PlatformIdentity};
use crate::ports::{Host, PackageAction};
use crate::runtime::providers::RuntimeProvider;
use crate::runtime::selector::ProviderKind;
use crate::version::{candidate_names, matches, ResolvedPackage};
use std::cell::OnceCell;
use std::path::PathBuf;

type PackageTable = &'static [(&'static str, &'static [&'static str])];

/// Table key used when no version-specific entry applies.
const DEFAULT_KEY: &str = "default";

const DEBIAN_PACKAGES: PackageTable = &[
    ("8", &["ruby2.1"]),
    ("7", &["ruby1.9.3", "ruby1.9.1", "ruby1.8"]),
    ("6", &["ruby1.8"]),
];

const UBUNTU_PACKAGES: PackageTable = &[
    ("14.04", &["ruby2.0", "ruby1.9.3"]),
    ("12.04", &["ruby1.9.3", "ruby1.8"]),
    ("10.04", &["ruby1.9.1", "ruby1.8"]),
];

const RPM_PACKAGES: PackageTable = &[(DEFAULT_KEY, &["ruby"])];

/// Package names known to exist on a platform.
///
/// A table key applies when it equals the platform version or is a
/// leading dotted prefix of it (`7` covers `7.11`). Platforms without an
/// entry get the bare `ruby` package.
pub fn known_packages(platform: &PlatformIdentity) -> Vec<&'static str> {
    let table = match platform.family {
        PlatformFamily::Debian => DEBIAN_PACKAGES,
        PlatformFamily::Ubuntu => UBUNTU_PACKAGES,
        PlatformFamily::Rhel
        | PlatformFamily::Centos
        | PlatformFamily::Fedora
        | PlatformFamily::Amazon => RPM_PACKAGES,
        PlatformFamily::Other => &[],
    };

    let version = platform.version.as_str();
    let entry = table
        .iter()
        .find(|(key, _)| {
            version == *key
                || version
                    .strip_prefix(key)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .or_else(|| table.iter().find(|(key, _)| *key == DEFAULT_KEY));

    match entry {
        Some((_, names)) => names.to_vec(),
        None => {
            tracing::debug!("No known packages for {}, defaulting to ruby", platform);
            vec!["ruby"]
        }
    }
}

/// Development headers package for a Ruby package.
///
/// `ruby1.9.3` ships its headers as `ruby1.9.1-dev` on Debian.
pub fn dev_package_name(package: &str, family: PlatformFamily) -> Option<String> {
    let suffix = match family {
        PlatformFamily::Debian | PlatformFamily::Ubuntu => "-dev",
        PlatformFamily::Rhel
        | PlatformFamily::Centos
        | PlatformFamily::Fedora
        | PlatformFamily::Amazon => "-devel",
        PlatformFamily::Other => return None,
    };
    let name = format!("{}{}", package, suffix);
    if name == "ruby1.9.3-dev" {
        return Some("ruby1.9.1-dev".to_string());
    }
    Some(name)
}

/// Whether a platform ships rubygems separately from ruby.
fn rubygems_packaged_separately(platform: &PlatformIdentity) -> bool {
    platform.family.is_rhel_like() && platform.major_version() == "6"
}

/// Ruby from the distribution's package manager.
#[derive(Debug)]
pub struct NativePackage {
    version: String,
    options: ProviderOptions,
    resolved: OnceCell<ResolvedPackage>,
}

impl NativePackage {
    /// Provider for a version request.
    pub fn new(version: impl Into<String>, options: ProviderOptions) -> Self {
        Self {
            version: version.into(),
            options,
            resolved: OnceCell::new(),
        }
    }

    /// Package names to try on a platform, in order.
    pub fn candidate_packages(&self, platform: &PlatformIdentity) -> Vec<String> {
        if let Some(name) = &self.options.package_name {
            return vec![name.clone()];
        }
        let known = known_packages(platform);
        candidate_names(&self.version)
            .into_iter()
            .filter(|name| known.contains(&name.as_str()))
            .collect()
    }

    /// The selected package, queried at most once.
    pub fn resolve(&self, host: &Host<'_>) -> Result<&ResolvedPackage> {
        if let Some(resolved) = self.resolved.get() {
            return Ok(resolved);
        }
        let resolved = self.query_candidates(host)?;
        Ok(self.resolved.get_or_init(|| resolved))
    }

    fn query_candidates(&self, host: &Host<'_>) -> Result<ResolvedPackage> {
        let names = self.candidate_packages(host.platform);
        tracing::debug!(
            "Package candidates for Ruby {:?} on {}: {:?}",
            self.version,
            host.platform,
            names
        );

        let mut rejected = Vec::new();
        for name in names {
            let version = match &self.options.package_version {
                Some(pin) => Some(pin.clone()),
                None => host.packages.candidate_version(&name)?,
            };
            match version {
                Some(v) if matches(&v, &self.version) => {
                    tracing::info!("Selected package {} {}", name, v);
                    return Ok(ResolvedPackage {
                        name,
                        installed_version: v,
                    });
                }
                version => {
                    tracing::debug!("Rejected package {} ({:?})", name, version);
                    rejected.push(RejectedCandidate { name, version });
                }
            }
        }

        Err(self.no_candidate(host.platform, rejected))
    }

    fn no_candidate(&self, platform: &PlatformIdentity, rejected: Vec<RejectedCandidate>) -> RigError {
        RigError::NoCandidatePackage {
            version: self.version.clone(),
            rejected,
            proposed: match &self.options.package_name {
                Some(name) => vec![name.clone()],
                None => candidate_names(&self.version),
            },
            known: known_packages(platform)
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// The main package plus its headers and rubygems companions.
    fn package_set(&self, package: &str, platform: &PlatformIdentity) -> PackageSet {
        let dev = match &self.options.dev_package {
            Toggle::Value(name) if !name.is_empty() => Some(name.clone()),
            toggle if toggle.is_enabled() => dev_package_name(package, platform.family),
            _ => None,
        };

        let rubygems = self
            .options
            .rubygems_package
            .clone()
            .unwrap_or_else(|| Toggle::Flag(rubygems_packaged_separately(platform)));
        let rubygems = rubygems
            .is_enabled()
            .then(|| rubygems.value().unwrap_or("rubygems").to_string());

        PackageSet {
            main: package.to_string(),
            dev,
            rubygems,
        }
    }
}

struct PackageSet {
    main: String,
    dev: Option<String>,
    rubygems: Option<String>,
}

impl RuntimeProvider for NativePackage {
    fn kind(&self) -> ProviderKind {
        ProviderKind::System
    }

    fn install(&self, host: &Host<'_>) -> Result<bool> {
        let resolved = self.resolve(host)?;
        let action = if self.options.package_upgrade {
            PackageAction::Upgrade
        } else {
            PackageAction::Install
        };
        let pin = self.options.package_version.as_deref();
        let set = self.package_set(&resolved.name, host.platform);

        let mut changed = host.packages.apply(&set.main, pin, action)?;
        if let Some(dev) = &set.dev {
            changed |= host.packages.apply(dev, pin, action)?;
        }
        if let Some(rubygems) = &set.rubygems {
            changed |= host.packages.apply(rubygems, None, action)?;
        }
        Ok(changed)
    }

    fn uninstall(&self, host: &Host<'_>) -> Result<bool> {
        let package = self
            .candidate_packages(host.platform)
            .into_iter()
            .next()
            .ok_or_else(|| self.no_candidate(host.platform, Vec::new()))?;
        let action = if host.platform.family.is_debian_like() {
            PackageAction::Purge
        } else {
            PackageAction::Remove
        };

        let set = self.package_set(&package, host.platform);
        let mut changed = false;
        for name in std::iter::once(set.main).chain(set.dev).chain(set.rubygems) {
            changed |= host.packages.apply(&name, None, action)?;
        }
        Ok(changed)
    }

    fn ruby_binary(&self, host: &Host<'_>) -> Result<PathBuf> {
        Ok(PathBuf::from("/usr/bin").join(&self.resolve(host)?.name))
    }
}

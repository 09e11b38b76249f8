//! Ruby from Software Collections.

use crate::error::{RigError, Result};
use crate::platform::PlatformIdentity;
use crate::ports::collection::COLLECTION_ROOT;
use crate::ports::{Host, PackageAction};
use crate::runtime::providers::RuntimeProvider;
use crate::runtime::selector::ProviderKind;
use crate::version::matches;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One collection and the platforms it is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPackage {
    /// Ruby version shipped by the collection.
    pub version: &'static str,
    /// Collection id, also its package name.
    pub id: &'static str,
    /// `(family, major version)` pairs the collection supports.
    pub platforms: &'static [(&'static str, &'static str)],
}

impl CollectionPackage {
    /// Headers package shipped alongside the interpreter.
    pub fn dev_package(&self) -> String {
        format!("{}-ruby-devel", self.id)
    }

    /// Whether the collection is published for a platform.
    pub fn supports(&self, platform: &PlatformIdentity) -> bool {
        self.platforms.iter().any(|(family, major)| {
            *family == platform.family.as_str() && *major == platform.major_version()
        })
    }
}

/// Known collections, newest first.
pub const COLLECTIONS: &[CollectionPackage] = &[
    CollectionPackage {
        version: "2.3.1",
        id: "rh-ruby23",
        platforms: &[("rhel", "7"), ("centos", "7")],
    },
    CollectionPackage {
        version: "2.2.2",
        id: "rh-ruby22",
        platforms: &[("rhel", "7"), ("centos", "7"), ("rhel", "6"), ("centos", "6")],
    },
    CollectionPackage {
        version: "2.0.0",
        id: "ruby200",
        platforms: &[("rhel", "6"), ("centos", "6"), ("fedora", "21"), ("fedora", "20")],
    },
    CollectionPackage {
        version: "1.9.3",
        id: "ruby193",
        platforms: &[
            ("rhel", "7"),
            ("centos", "7"),
            ("rhel", "6"),
            ("centos", "6"),
            ("fedora", "21"),
            ("fedora", "20"),
        ],
    },
];

/// First collection whose version satisfies the request on a platform.
pub fn find_collection(version: &str, platform: &PlatformIdentity) -> Option<&'static CollectionPackage> {
    COLLECTIONS
        .iter()
        .find(|c| matches(c.version, version) && c.supports(platform))
}

/// Ruby from a Software Collection.
#[derive(Debug)]
pub struct SoftwareCollection {
    version: String,
}

impl SoftwareCollection {
    /// Provider for a version request.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// The collection serving this request on the host platform.
    pub fn collection(&self, platform: &PlatformIdentity) -> Result<&'static CollectionPackage> {
        find_collection(&self.version, platform).ok_or_else(|| RigError::NoMatchingCollection {
            version: self.version.clone(),
            platform: platform.to_string(),
            known: COLLECTIONS
                .iter()
                .map(|c| format!("{} ({})", c.version, c.id))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

impl RuntimeProvider for SoftwareCollection {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Scl
    }

    fn install(&self, host: &Host<'_>) -> Result<bool> {
        let collection = self.collection(host.platform)?;
        tracing::info!("Installing collection {}", collection.id);
        let mut changed = host
            .packages
            .apply(collection.id, None, PackageAction::Install)?;
        changed |= host
            .packages
            .apply(&collection.dev_package(), None, PackageAction::Install)?;
        Ok(changed)
    }

    fn uninstall(&self, host: &Host<'_>) -> Result<bool> {
        let collection = self.collection(host.platform)?;
        let mut changed = host
            .packages
            .apply(&collection.dev_package(), None, PackageAction::Remove)?;
        changed |= host
            .packages
            .apply(collection.id, None, PackageAction::Remove)?;
        Ok(changed)
    }

    fn ruby_binary(&self, host: &Host<'_>) -> Result<PathBuf> {
        let collection = self.collection(host.platform)?;
        Ok(PathBuf::from(COLLECTION_ROOT)
            .join(collection.id)
            .join("root/usr/bin/ruby"))
    }

    fn ruby_environment(&self, host: &Host<'_>) -> Result<BTreeMap<String, String>> {
        let collection = self.collection(host.platform)?;
        host.collections.environment(collection.id)
    }
}

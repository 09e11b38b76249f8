//! Provider selection.
//!
//! An explicit provider name always wins. Otherwise providers are asked in
//! priority order whether they serve the platform; the first that says yes
//! is used.

use crate::config::RuntimeConfig;
use crate::error::{RigError, Result};
use crate::platform::{PlatformFamily, PlatformIdentity};
use crate::runtime::providers::collection::find_collection;
use crate::runtime::providers::{
    NativePackage, Preinstalled, RuntimeProvider, SoftwareCollection, Stub,
};
use std::fmt;
use std::str::FromStr;

/// The registered providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Distribution packages.
    System,
    /// Software Collections.
    Scl,
    /// An existing interpreter.
    Preinstalled,
    /// Fixed answers for tests.
    Stub,
}

/// Auto-detection order when none is configured.
pub const DEFAULT_PRIORITY: &[ProviderKind] = &[ProviderKind::Scl, ProviderKind::System];

impl ProviderKind {
    /// Every provider, in display order.
    pub const ALL: &'static [ProviderKind] = &[
        ProviderKind::System,
        ProviderKind::Scl,
        ProviderKind::Preinstalled,
        ProviderKind::Stub,
    ];

    /// Name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Scl => "scl",
            Self::Preinstalled => "preinstalled",
            Self::Stub => "stub",
        }
    }

    /// Whether this provider serves `version` on `platform` without being asked.
    pub fn auto_detect(&self, platform: &PlatformIdentity, version: &str) -> bool {
        match self {
            Self::System => platform.family != PlatformFamily::Other,
            Self::Scl => {
                platform.family.is_rhel_like() && find_collection(version, platform).is_some()
            }
            Self::Preinstalled | Self::Stub => false,
        }
    }

    /// Build the provider for a configured runtime.
    pub fn build(&self, config: &RuntimeConfig) -> Box<dyn RuntimeProvider> {
        match self {
            Self::System => Box::new(NativePackage::new(
                config.version.clone(),
                config.options.clone(),
            )),
            Self::Scl => Box::new(SoftwareCollection::new(config.version.clone())),
            Self::Preinstalled => Box::new(Preinstalled::new(config.options.ruby_binary.clone())),
            Self::Stub => Box::new(Stub::from_options(&config.options)),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "system" | "native" => Ok(Self::System),
            "scl" | "collection" => Ok(Self::Scl),
            "preinstalled" => Ok(Self::Preinstalled),
            "stub" | "dummy" => Ok(Self::Stub),
            _ => Err(RigError::UnknownProvider {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses a provider for a runtime.
#[derive(Debug, Clone)]
pub struct ProviderSelector {
    priority: Vec<ProviderKind>,
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderSelector {
    /// Selector with the default priority.
    pub fn new() -> Self {
        Self::with_priority(DEFAULT_PRIORITY.to_vec())
    }

    /// Selector with a custom priority.
    pub fn with_priority(priority: Vec<ProviderKind>) -> Self {
        Self { priority }
    }

    /// Pick a provider kind.
    pub fn select(
        &self,
        explicit: Option<&str>,
        platform: &PlatformIdentity,
        version: &str,
    ) -> Result<ProviderKind> {
        if let Some(name) = explicit {
            return name.parse();
        }
        let kind = self
            .priority
            .iter()
            .copied()
            .find(|kind| kind.auto_detect(platform, version))
            .ok_or_else(|| RigError::NoAutoProvider {
                platform: platform.to_string(),
            })?;
        tracing::debug!("Auto-selected provider {} for Ruby {:?} on {}", kind, version, platform);
        Ok(kind)
    }

    /// Pick and build the provider for a configured runtime.
    pub fn provider_for(
        &self,
        config: &RuntimeConfig,
        platform: &PlatformIdentity,
    ) -> Result<Box<dyn RuntimeProvider>> {
        let kind = self.select(config.provider.as_deref(), platform, &config.version)?;
        Ok(kind.build(config))
    }
}

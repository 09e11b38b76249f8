//! Target platform identity.
//!
//! A [`PlatformIdentity`] is supplied once per resolution and never
//! mutated. Detection reads `/etc/os-release`; `RUBYRIG_PLATFORM`
//! (`family:version`) overrides it, which is mostly useful for planning
//! a run for a different host.

use std::fmt;
use std::str::FromStr;

/// Environment variable that overrides platform detection.
pub const PLATFORM_ENV: &str = "RUBYRIG_PLATFORM";

/// Operating system family (or distribution, where it matters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Debian,
    Ubuntu,
    Rhel,
    Centos,
    Fedora,
    Amazon,
    Other,
}

impl PlatformFamily {
    /// Lowercase name as used in configuration and tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debian => "debian",
            Self::Ubuntu => "ubuntu",
            Self::Rhel => "rhel",
            Self::Centos => "centos",
            Self::Fedora => "fedora",
            Self::Amazon => "amazon",
            Self::Other => "other",
        }
    }

    /// Whether this family uses dpkg/apt.
    pub fn is_debian_like(&self) -> bool {
        matches!(self, Self::Debian | Self::Ubuntu)
    }

    /// Whether this family uses rpm/yum.
    pub fn is_rpm_based(&self) -> bool {
        matches!(self, Self::Rhel | Self::Centos | Self::Fedora | Self::Amazon)
    }

    /// Whether this is Red Hat Enterprise Linux or a rebuild of it.
    pub fn is_rhel_like(&self) -> bool {
        matches!(self, Self::Rhel | Self::Centos)
    }
}

impl FromStr for PlatformFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debian" => Ok(Self::Debian),
            "ubuntu" => Ok(Self::Ubuntu),
            "rhel" | "redhat" => Ok(Self::Rhel),
            "centos" | "rocky" | "almalinux" | "ol" => Ok(Self::Centos),
            "fedora" => Ok(Self::Fedora),
            "amazon" | "amzn" => Ok(Self::Amazon),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown platform family: {}", s)),
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family plus version string, e.g. `ubuntu 14.04`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformIdentity {
    pub family: PlatformFamily,
    pub version: String,
}

impl PlatformIdentity {
    /// Create a platform identity.
    pub fn new(family: PlatformFamily, version: impl Into<String>) -> Self {
        Self {
            family,
            version: version.into(),
        }
    }

    /// Leading numeric component of the version (`"7"` for `"7.4.1708"`).
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or("")
    }

    /// Detect the platform of the running host.
    pub fn detect() -> Self {
        Self::detect_with(
            |key| std::env::var(key),
            || std::fs::read_to_string("/etc/os-release").ok(),
        )
    }

    /// Detect with injectable environment and os-release lookups.
    pub fn detect_with<F, R>(env_fn: F, os_release: R) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
        R: Fn() -> Option<String>,
    {
        if let Ok(value) = env_fn(PLATFORM_ENV) {
            match value.parse() {
                Ok(identity) => return identity,
                Err(e) => tracing::warn!("Ignoring {}: {}", PLATFORM_ENV, e),
            }
        }

        let identity = os_release()
            .map(|content| Self::from_os_release(&content))
            .unwrap_or_else(|| Self::new(PlatformFamily::Other, ""));
        tracing::debug!("Detected platform {}", identity);
        identity
    }

    /// Parse the contents of an os-release file.
    pub fn from_os_release(content: &str) -> Self {
        let mut id = String::new();
        let mut id_like = String::new();
        let mut version = String::new();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "ID" => id = value.to_string(),
                "ID_LIKE" => id_like = value.to_string(),
                "VERSION_ID" => version = value.to_string(),
                _ => {}
            }
        }

        let family = id.parse().unwrap_or_else(|_| {
            // Derivatives not in the table inherit from their parent distribution.
            id_like
                .split_whitespace()
                .find_map(|like| like.parse().ok())
                .unwrap_or(PlatformFamily::Other)
        });

        Self::new(family, version)
    }
}

impl FromStr for PlatformIdentity {
    type Err = String;

    /// Parse `family:version` (version optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (family, version) = s.split_once(':').unwrap_or((s, ""));
        Ok(Self::new(family.trim().parse()?, version.trim()))
    }
}

impl fmt::Display for PlatformIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.family)
        } else {
            write!(f, "{} {}", self.family, self.version)
        }
    }
}

//! Version request matching and package-name candidates.
//!
//! Both functions here are pure. Platform-specific package tables live
//! with the native provider; this module only proposes generic names.

use regex::Regex;
use std::sync::LazyLock;

/// Name of the runtime, used as the prefix of every candidate package.
pub const RUNTIME_NAME: &str = "ruby";

/// Recent 2.x package names, newest first.
pub const RUBY2_NAMES: &[&str] = &["ruby2.3", "ruby2.2", "ruby2.1", "ruby2.0"];

/// 1.x package names, newest first.
pub const RUBY1_NAMES: &[&str] = &["ruby1.9.3", "ruby1.9.1", "ruby1.9", "ruby1.8"];

static PATCH_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+\.\d+)").expect("valid regex"));
static MINOR_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+)").expect("valid regex"));
static EPOCH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+:").expect("valid regex"));

/// A package name proposed for a version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCandidate {
    pub name: String,
    pub declared_version_request: String,
}

/// A package whose installable version satisfied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub installed_version: String,
}

/// Ordered package names to try for a version request, first match wins.
///
/// The empty request deliberately expands to every known 2.x and 1.x
/// name, newest first, followed by the bare `ruby` fallback.
///
/// Takes no platform: the list is the same everywhere, and the native
/// provider filters it through the platform's package table.
pub fn candidate_names(version_request: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    // Debian ships some releases under their full patch version.
    if let Some(m) = PATCH_VERSION.captures(version_request) {
        names.push(format!("{}{}", RUNTIME_NAME, &m[1]));
    }
    if let Some(m) = MINOR_VERSION.captures(version_request) {
        names.push(format!("{}{}", RUNTIME_NAME, &m[1]));
    }
    if version_request == "2" || version_request.is_empty() {
        names.extend(RUBY2_NAMES.iter().map(|s| s.to_string()));
    }
    if version_request == "1" || version_request.is_empty() {
        names.extend(RUBY1_NAMES.iter().map(|s| s.to_string()));
    }
    names.push(RUNTIME_NAME.to_string());

    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
    names
}

/// Candidates paired with the request they were proposed for.
pub fn candidates(version_request: &str) -> Vec<PackageCandidate> {
    candidate_names(version_request)
        .into_iter()
        .map(|name| PackageCandidate {
            name,
            declared_version_request: version_request.to_string(),
        })
        .collect()
}

/// Remove a leading `N:` package epoch.
pub fn strip_epoch(version: &str) -> &str {
    match EPOCH.find(version) {
        Some(m) => &version[m.end()..],
        None => version,
    }
}

/// Whether a resolved package version satisfies a version request.
pub fn matches(resolved_version: &str, version_request: &str) -> bool {
    version_request.is_empty() || strip_epoch(resolved_version).starts_with(version_request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_version_starts_with_patch_name() {
        let names = candidate_names("2.0.0");
        assert_eq!(names, vec!["ruby2.0.0", "ruby2.0", "ruby"]);
    }

    #[test]
    fn minor_version_has_single_specific_name() {
        assert_eq!(candidate_names("2.1"), vec!["ruby2.1", "ruby"]);
    }

    #[test]
    fn patch_suffixes_are_ignored_for_names() {
        assert_eq!(
            candidate_names("1.9.3-p551"),
            vec!["ruby1.9.3", "ruby1.9", "ruby"]
        );
    }

    #[test]
    fn major_two_lists_recent_releases() {
        let names = candidate_names("2");
        assert_eq!(names[..4], ["ruby2.3", "ruby2.2", "ruby2.1", "ruby2.0"]);
        assert_eq!(names.last().unwrap(), "ruby");
        assert!(!names.iter().any(|n| n.starts_with("ruby1")));
    }

    #[test]
    fn major_one_lists_legacy_releases() {
        let names = candidate_names("1");
        assert_eq!(
            names,
            vec!["ruby1.9.3", "ruby1.9.1", "ruby1.9", "ruby1.8", "ruby"]
        );
    }

    #[test]
    fn empty_request_lists_everything_newest_first() {
        let names = candidate_names("");
        let mut expected: Vec<&str> = RUBY2_NAMES.to_vec();
        expected.extend_from_slice(RUBY1_NAMES);
        expected.push("ruby");
        assert_eq!(names, expected);
    }

    #[test]
    fn candidates_have_no_duplicates() {
        for request in ["", "1", "2", "2.0", "2.0.0", "1.9.3"] {
            let names = candidate_names(request);
            let unique: std::collections::HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "duplicates for {:?}", request);
        }
    }

    #[test]
    fn unrecognised_request_falls_back_to_bare_name() {
        assert_eq!(candidate_names("jruby"), vec!["ruby"]);
    }

    #[test]
    fn candidates_carry_request() {
        let c = candidates("2.1");
        assert_eq!(c[0].name, "ruby2.1");
        assert_eq!(c[0].declared_version_request, "2.1");
    }

    #[test]
    fn strip_epoch_removes_numeric_prefix() {
        assert_eq!(strip_epoch("1:2.1.5-1"), "2.1.5-1");
        assert_eq!(strip_epoch("2.1.5"), "2.1.5");
        assert_eq!(strip_epoch("a:2.1"), "a:2.1");
    }

    #[test]
    fn matches_is_prefix_based() {
        assert!(matches("2.1.5", "2.1"));
        assert!(matches("1:2.1.5-1", "2.1"));
        assert!(matches("2.10.0", "2.1"));
        assert!(!matches("2.2.0", "2.1"));
        assert!(!matches("12:1.9.3", "2"));
    }

    #[test]
    fn empty_request_matches_anything() {
        assert!(matches("", ""));
        assert!(matches("1:1.8.7", ""));
    }
}

//! The directory bundle-scoped executables live in.
//!
//! Rules, first match wins:
//!
//! 1. `binstubs: true` - `<root>/bin`
//! 2. `binstubs: <dir>` - that directory
//! 3. `vendor` or `deployment` - `<vendor>/ruby/<abi>/bin`, or `<vendor>/ruby/bin`
//! 4. otherwise - the directory holding `bundle`
//!
//! `<root>` is the Gemfile's directory and every result is made absolute
//! against it.

use crate::bundle::context::BundleContext;
use crate::error::{RigError, Result};
use crate::ports::{expand_path, Filesystem};
use crate::version::matcher::RUNTIME_NAME;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Vendor directory used when `vendor` is not a path.
pub const DEFAULT_VENDOR_PATH: &str = "vendor/bundle";

static ABI_DIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d\.").expect("valid regex"));

/// Directory to put in front of `PATH` for a bundle.
pub fn extra_path_for_bundle(fs: &dyn Filesystem, bundle: &BundleContext) -> Result<PathBuf> {
    let root = bundle.root();

    let extra = if let Some(dir) = bundle.binstubs.value() {
        PathBuf::from(dir)
    } else if bundle.binstubs.is_enabled() {
        PathBuf::from("bin")
    } else if bundle.vendor.is_enabled() || bundle.deployment {
        vendor_bin_dir(fs, bundle, root)?
    } else {
        bundle
            .bundler_binary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"))
    };

    let resolved = expand_path(&extra, root);
    tracing::debug!("Bundle path for {}: {}", bundle.gemfile.display(), resolved.display());
    Ok(resolved)
}

fn vendor_bin_dir(fs: &dyn Filesystem, bundle: &BundleContext, root: &Path) -> Result<PathBuf> {
    let vendor = bundle.vendor.value().unwrap_or(DEFAULT_VENDOR_PATH);
    let base = expand_path(Path::new(vendor), root).join(RUNTIME_NAME);

    let entries = match fs.read_dir(&base) {
        Ok(entries) => entries,
        Err(RigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No vendor directory at {}", base.display());
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    if let Some(abi) = entries.iter().find(|name| ABI_DIR.is_match(name)) {
        return Ok(base.join(abi).join("bin"));
    }
    if entries.iter().any(|name| name == "bin") {
        return Ok(base.join("bin"));
    }
    Err(RigError::VendorBinDirNotFound {
        path: base,
        entries,
    })
}

//! Bundles: a Gemfile installed against a runtime.
//!
//! - [`context`] - Gemfile discovery and the bundler binary
//! - [`path`] - the directory bundle executables are found in
//! - [`install`] - `bundle install` / `bundle update`

pub mod context;
pub mod install;
pub mod path;

pub use context::{
    discover_bundler_binary, find_gemfile, BundleContext, BUNDLE_GEMFILE_ENV, GEMFILE,
};
pub use install::BundleInstall;
pub use path::{extra_path_for_bundle, DEFAULT_VENDOR_PATH};

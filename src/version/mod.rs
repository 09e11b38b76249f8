//! Ruby version requests and package-name candidates.
//!
//! Version requests are compared by string prefix, never by semantic
//! version ordering: `"2.1"` is satisfied by `"2.1.5"` and by `"1:2.1.5-1"`
//! (after the epoch is stripped), and also by `"2.10.0"`. An empty request
//! matches everything.

pub mod matcher;

pub use matcher::{candidate_names, matches, strip_epoch, PackageCandidate, ResolvedPackage};

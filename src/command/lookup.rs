//! Executable lookup against a search path.

use crate::error::{RigError, Result};
use crate::ports::Filesystem;
use std::path::{Path, PathBuf};

/// Separator between search path entries.
pub const PATH_SEPARATOR: char = ':';

/// Prepend `extra` to an inherited search path.
pub fn prepend_search_path(extra: &Path, inherited: &str) -> String {
    if inherited.is_empty() {
        extra.display().to_string()
    } else {
        format!("{}{}{}", extra.display(), PATH_SEPARATOR, inherited)
    }
}

/// Split a search path into directories, skipping empty entries.
pub fn split_search_path(search_path: &str) -> Vec<PathBuf> {
    search_path
        .split(PATH_SEPARATOR)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// First executable named `name` in the search path directories.
///
/// Does not shell out to `which`; each directory is probed through the
/// filesystem port.
pub fn find_executable(fs: &dyn Filesystem, name: &str, search_path: &str) -> Option<PathBuf> {
    split_search_path(search_path)
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|candidate| fs.is_executable(candidate))
}

/// Resolve the program of a command for use after `bundle exec`.
///
/// Absolute paths are kept. Bare names are searched on `search_path` and
/// become absolute. A name that is not on the path but exists relative to
/// `cwd` (a script such as `myapp.rb`) is kept as written.
pub fn resolve_program(
    fs: &dyn Filesystem,
    program: &str,
    search_path: &str,
    cwd: &Path,
) -> Result<String> {
    if Path::new(program).is_absolute() {
        return Ok(program.to_string());
    }
    if !program.contains('/') {
        if let Some(found) = find_executable(fs, program, search_path) {
            tracing::debug!("Resolved {} to {}", program, found.display());
            return Ok(found.display().to_string());
        }
    }
    if fs.is_file(&cwd.join(program)) {
        return Ok(program.to_string());
    }
    Err(RigError::CommandNotFound {
        command: program.to_string(),
        path: search_path.to_string(),
    })
}

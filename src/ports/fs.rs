//! Filesystem port.
//!
//! Only the handful of queries the core needs: directory listing, file and
//! directory checks, and executability. Path expansion is lexical and
//! lives here as a free function.

use crate::error::Result;
use std::path::{Component, Path, PathBuf};

/// Read-only filesystem queries.
pub trait Filesystem {
    /// Names of the entries in a directory, sorted.
    fn read_dir(&self, dir: &Path) -> Result<Vec<String>>;

    /// Whether the path is an existing regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether the path is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether the path is a file that can be executed.
    fn is_executable(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read_dir(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_file() && has_exec_bits(path)
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
fn has_exec_bits(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
fn has_exec_bits(_path: &Path) -> bool {
    true
}

/// Resolve `path` against `base` and normalise `.` and `..` lexically.
///
/// Absolute paths ignore `base`. Symlinks are not followed.
pub fn expand_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn expand_path_joins_relative() {
        assert_eq!(
            expand_path(Path::new("bin"), Path::new("/srv/app")),
            PathBuf::from("/srv/app/bin")
        );
    }

    #[test]
    fn expand_path_keeps_absolute() {
        assert_eq!(
            expand_path(Path::new("/opt/bin"), Path::new("/srv/app")),
            PathBuf::from("/opt/bin")
        );
    }

    #[test]
    fn expand_path_normalises_dots() {
        assert_eq!(
            expand_path(Path::new("../shared/./bin"), Path::new("/srv/app")),
            PathBuf::from("/srv/shared/bin")
        );
        assert_eq!(
            expand_path(Path::new("../../.."), Path::new("/srv")),
            PathBuf::from("/")
        );
    }

    #[test]
    fn read_dir_is_sorted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("b")).unwrap();
        fs::create_dir(temp.path().join("a")).unwrap();
        fs::write(temp.path().join("c"), "").unwrap();

        let names = OsFilesystem.read_dir(temp.path()).unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn read_dir_missing_is_error() {
        assert!(OsFilesystem.read_dir(Path::new("/nonexistent/dir")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn executable_requires_mode_bits() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let script = temp.path().join("tool");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(!OsFilesystem.is_executable(&script));
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(OsFilesystem.is_executable(&script));
        assert!(!OsFilesystem.is_executable(temp.path()));
    }
}

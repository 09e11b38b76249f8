//! Local user accounts.

use std::path::PathBuf;

/// User commands run as when none is configured and this process is root.
pub const DEFAULT_USER: &str = "root";

/// A resolved local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: PathBuf,
}

/// Look up an account in the password database.
#[cfg(unix)]
pub fn lookup(name: &str) -> Option<Account> {
    use std::ffi::{CStr, CString};

    let c_name = CString::new(name).ok()?;
    // SAFETY: passwd is plain old data; getpwnam_r fills it from buf.
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut buf = vec![0 as libc::c_char; 16 * 1024];
    let mut result: *mut libc::passwd = std::ptr::null_mut();
    // SAFETY: all pointers are valid for the duration of the call.
    let rc = unsafe {
        libc::getpwnam_r(
            c_name.as_ptr(),
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() || pwd.pw_dir.is_null() {
        return None;
    }
    // SAFETY: pw_dir points into buf, which is still alive.
    let home = unsafe { CStr::from_ptr(pwd.pw_dir) }
        .to_string_lossy()
        .into_owned();

    Some(Account {
        name: name.to_string(),
        uid: pwd.pw_uid,
        gid: pwd.pw_gid,
        home: PathBuf::from(home),
    })
}

#[cfg(not(unix))]
pub fn lookup(_name: &str) -> Option<Account> {
    None
}

/// Effective uid of this process.
#[cfg(unix)]
pub fn current_uid() -> Option<u32> {
    // SAFETY: geteuid() is a simple syscall that returns the effective user ID
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
pub fn current_uid() -> Option<u32> {
    None
}

/// User to run as when none is requested.
///
/// Root processes default to [`DEFAULT_USER`]. Anyone else keeps their own
/// identity (`None`), since switching to another uid needs privileges.
pub fn default_user() -> Option<String> {
    default_user_for(current_uid())
}

fn default_user_for(uid: Option<u32>) -> Option<String> {
    match uid {
        Some(0) => Some(DEFAULT_USER.to_string()),
        _ => None,
    }
}

/// Working directory for commands run as `user`, or as the current user.
pub fn home_directory(user: Option<&str>) -> PathBuf {
    match user {
        Some(name) => default_directory(name),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .filter(|home| home.is_dir())
            .unwrap_or_else(|| PathBuf::from("/")),
    }
}

/// Working directory for commands run as `user`.
///
/// The user's home directory, except for root which runs from `/`.
/// Unknown users and missing homes fall back to `/`.
pub fn default_directory(user: &str) -> PathBuf {
    if user == DEFAULT_USER {
        return PathBuf::from("/");
    }
    lookup(user)
        .map(|account| account.home)
        .filter(|home| home.is_dir())
        .unwrap_or_else(|| PathBuf::from("/"))
}

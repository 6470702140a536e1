//! Path utilities for locating jobsift's data directory.
//!
//! The data directory holds trace exports. Resolution order is
//! `JOBSIFT_DATA_DIR`, then `$XDG_DATA_HOME/jobsift`, then
//! `$HOME/.local/share/jobsift`, then the system temporary directory.

use std::path::PathBuf;

/// Returns the data directory for jobsift files.
///
/// # Examples
///
/// ```
/// use jobsift::infrastructure::get_data_dir;
///
/// let dir = get_data_dir();
/// assert!(dir.ends_with("jobsift") || std::env::var_os("JOBSIFT_DATA_DIR").is_some());
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("JOBSIFT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("jobsift");
    }
    std::env::var_os("HOME").map_or_else(
        || std::env::temp_dir().join("jobsift"),
        |home| PathBuf::from(home).join(".local").join("share").join("jobsift"),
    )
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a tilde, and all paths when `HOME` is unset, are returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use jobsift::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("/etc/jobsift.toml"), "/etc/jobsift.toml");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    let Some(home) = std::env::var_os("HOME") else {
        return path.to_string();
    };
    let home = home.to_string_lossy();
    if let Some(rest) = path.strip_prefix("~/") {
        format!("{home}/{rest}")
    } else if path == "~" {
        home.into_owned()
    } else {
        path.to_string()
    }
}

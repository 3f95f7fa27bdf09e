//! Storage locations inside the Zellij sandbox.

use std::path::PathBuf;

/// Sandbox mount point of the host directory Zellij was started from.
const HOST_ROOT: &str = "/host";

/// Returns the data directory for booksearch files.
///
/// In Zellij's plugin sandbox `/host` points at the directory Zellij was
/// started from (usually the user's home), so this normally resolves to
/// `~/.local/share/zellij/booksearch`.
///
/// # Examples
///
/// ```
/// use booksearch::infrastructure::get_data_dir;
///
/// assert_eq!(
///     get_data_dir().to_str(),
///     Some("/host/.local/share/zellij/booksearch")
/// );
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from(HOST_ROOT)
        .join(".local")
        .join("share")
        .join("zellij")
        .join("booksearch")
}

/// Expands a leading `~` to the sandbox's `/host` mount.
///
/// ```
/// use booksearch::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/books.toml"), "/host/books.toml");
/// assert_eq!(expand_tilde("~"), "/host");
/// assert_eq!(expand_tilde("/etc/books.toml"), "/etc/books.toml");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        HOST_ROOT.to_string()
    } else if let Some(rest) = path.strip_prefix("~/") {
        format!("{HOST_ROOT}/{rest}")
    } else {
        path.to_string()
    }
}

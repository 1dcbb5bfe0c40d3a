//! Path helpers for XDG icon base directories.

use std::collections::HashSet;
use std::path::PathBuf;

/// Legacy location of application icons that predate icon themes.
pub const PIXMAPS_DIR: &str = "/usr/share/pixmaps";

const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// Get base icon directories from the current environment.
///
/// Order: `~/.icons`, `$XDG_DATA_HOME/icons`, `icons` under every
/// `$XDG_DATA_DIRS` entry, then the legacy pixmap directory.
pub fn get_icon_base_directories() -> Vec<PathBuf> {
    icon_base_directories_from(
        dirs::home_dir(),
        std::env::var("XDG_DATA_HOME").ok(),
        std::env::var("XDG_DATA_DIRS").ok(),
    )
}

/// Same as [`get_icon_base_directories`], with the environment passed in.
pub fn icon_base_directories_from(
    home: Option<PathBuf>,
    data_home: Option<String>,
    data_dirs: Option<String>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let home = home.filter(|h| !h.as_os_str().is_empty());

    // User icons
    if let Some(home) = &home {
        dirs.push(home.join(".icons"));
    }

    let data_home = data_home
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|h| h.join(".local/share")));
    if let Some(data_home) = data_home {
        dirs.push(data_home.join("icons"));
    }

    // System icons
    let data_dirs = data_dirs
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIRS.to_string());
    for data_dir in data_dirs.split(':') {
        if !data_dir.is_empty() {
            dirs.push(PathBuf::from(data_dir).join("icons"));
        }
    }

    // Standard fallback
    dirs.push(PathBuf::from(PIXMAPS_DIR));

    let mut seen = HashSet::new();
    dirs.retain(|d| seen.insert(d.clone()));
    dirs
}

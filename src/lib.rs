//! capy-icons: Freedesktop icon theme resolver for Linux desktops.
//!
//! Resolves icon names like "firefox" or "bluetooth-symbolic" to files on disk:
//! - Theme metadata from `index.theme`, with inheritance down to hicolor
//! - Exact size matching, then closest size, then unthemed icons
//! - In-memory snapshots of the icon directories, re-validated every few seconds

mod cache;
mod config;
mod error;
mod lookup;
mod paths;
mod theme;

#[cfg(test)]
mod test_support;

pub use cache::{DEFAULT_STALE_AFTER, PresenceCache};
pub use config::{DEFAULT_EXTENSIONS, DEFAULT_SCALE, DEFAULT_SIZE, LookupConfig};
pub use error::{DescriptorError, IconError};
pub use lookup::{Icon, IconLookup, SYMBOLIC_SUFFIX, is_symbolic};
pub use paths::{PIXMAPS_DIR, get_icon_base_directories, icon_base_directories_from};
pub use theme::{DirType, FALLBACK_THEME, SubdirRule, ThemeCache, ThemeInfo, default_theme};

use std::path::PathBuf;
use std::sync::OnceLock;

static LOOKUP: OnceLock<IconLookup> = OnceLock::new();

/// Get the global icon lookup, built from the desktop settings on first use.
pub fn get_lookup() -> &'static IconLookup {
    LOOKUP.get_or_init(IconLookup::new)
}

/// Convenience function to look up an icon path by name at the default size.
pub fn get_icon(name: &str) -> Option<PathBuf> {
    get_lookup().lookup(name).ok().map(|icon| icon.path)
}

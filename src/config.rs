//! Lookup configuration.

use crate::cache::DEFAULT_STALE_AFTER;
use crate::error::IconError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];
pub const DEFAULT_SIZE: u32 = 48;
pub const DEFAULT_SCALE: u32 = 1;

/// Settings read once when an [`IconLookup`](crate::IconLookup) is built.
///
/// Unset fields (`None`, empty, or 0) take the documented defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Primary theme. Queried from the desktop settings if unset.
    pub theme: Option<String>,
    /// Theme searched after everything else failed.
    pub fallback_theme: Option<String>,
    /// File extensions in priority order. Defaults to png, svg, xpm.
    pub extensions: Vec<String>,
    /// Size used by `lookup`. Defaults to 48.
    pub default_size: u32,
    /// Scale used by `lookup`. Defaults to 1.
    pub default_scale: u32,
    /// How long directory snapshots are trusted. Defaults to 5 seconds.
    pub cache_ttl_ms: Option<u64>,
    /// Replaces the XDG base directories.
    pub base_dirs: Option<Vec<PathBuf>>,
}

impl LookupConfig {
    /// Load from a JSON config file.
    pub fn load(path: &Path) -> Result<Self, IconError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to a JSON config file
    pub fn save(&self, path: &Path) -> Result<(), IconError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn with_fallback_theme(mut self, theme: impl Into<String>) -> Self {
        self.fallback_theme = Some(theme.into());
        self
    }

    pub fn with_base_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.base_dirs = Some(dirs);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_ms = Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub(crate) fn extensions_or_default(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            self.extensions.clone()
        }
    }

    pub(crate) fn default_size_or_default(&self) -> u32 {
        if self.default_size == 0 {
            DEFAULT_SIZE
        } else {
            self.default_size
        }
    }

    pub(crate) fn default_scale_or_default(&self) -> u32 {
        if self.default_scale == 0 {
            DEFAULT_SCALE
        } else {
            self.default_scale
        }
    }

    pub(crate) fn cache_ttl(&self) -> Duration {
        self.cache_ttl_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_STALE_AFTER)
    }
}

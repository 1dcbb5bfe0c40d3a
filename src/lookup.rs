//! Icon lookup across themes, their parents and the unthemed base directories.

use crate::cache::PresenceCache;
use crate::config::LookupConfig;
use crate::error::IconError;
use crate::paths::get_icon_base_directories;
use crate::theme::{SubdirRule, ThemeCache, ThemeInfo, default_theme};
use log::{debug, info, trace};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name suffix of monochrome icons meant to be recolored by the renderer.
pub const SYMBOLIC_SUFFIX: &str = "-symbolic";

/// Whether `name` follows the symbolic icon naming convention.
pub fn is_symbolic(name: &str) -> bool {
    name.ends_with(SYMBOLIC_SUFFIX)
}

/// A resolved icon file.
///
/// Sizes are copied from the theme directory the file was found in, and are
/// all zero for icons found outside any theme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Icon {
    pub name: String,
    pub path: PathBuf,
    pub size: u32,
    pub min_size: u32,
    pub max_size: u32,
    pub scale: u32,
}

impl Icon {
    fn themed(name: &str, path: PathBuf, rule: &SubdirRule) -> Self {
        Self {
            name: name.to_string(),
            path,
            size: rule.size,
            min_size: rule.min_size,
            max_size: rule.max_size,
            scale: rule.scale,
        }
    }

    fn unthemed(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            path,
            size: 0,
            min_size: 0,
            max_size: 0,
            scale: 0,
        }
    }

    /// File extension, which tells the renderer how to decode the file.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    pub fn is_symbolic(&self) -> bool {
        is_symbolic(&self.name)
    }
}

/// Resolves icon names to files following theme inheritance.
///
/// Every instance owns its own theme and directory caches.
pub struct IconLookup {
    theme: String,
    fallback_theme: Option<String>,
    extensions: Vec<String>,
    default_size: u32,
    default_scale: u32,
    base_dirs: Vec<PathBuf>,
    themes: ThemeCache,
    presence: PresenceCache,
}

impl IconLookup {
    /// Create a lookup using the desktop's icon theme and XDG directories.
    pub fn new() -> Self {
        Self::with_config(LookupConfig::default())
    }

    pub fn with_config(config: LookupConfig) -> Self {
        let theme = config
            .theme
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(default_theme);
        let fallback_theme = config.fallback_theme.clone().filter(|t| !t.is_empty());
        let base_dirs = config
            .base_dirs
            .clone()
            .unwrap_or_else(get_icon_base_directories);

        info!(
            "Icon lookup: theme={} fallback={:?} base_dirs={}",
            theme,
            fallback_theme,
            base_dirs.len()
        );

        Self {
            theme,
            fallback_theme,
            extensions: config.extensions_or_default(),
            default_size: config.default_size_or_default(),
            default_scale: config.default_scale_or_default(),
            base_dirs,
            themes: ThemeCache::new(),
            presence: PresenceCache::new(config.cache_ttl()),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn fallback_theme(&self) -> Option<&str> {
        self.fallback_theme.as_deref()
    }

    pub fn base_dirs(&self) -> &[PathBuf] {
        &self.base_dirs
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn presence_cache(&self) -> &PresenceCache {
        &self.presence
    }

    /// Metadata of an installed theme.
    pub fn theme_info(&self, theme: &str) -> Result<Arc<ThemeInfo>, IconError> {
        self.themes.get(theme, &self.base_dirs)
    }

    /// Snapshot every base directory up front. Returns how many exist.
    pub fn warm_cache(&self) -> usize {
        self.base_dirs
            .iter()
            .filter(|dir| self.presence.warm(dir))
            .count()
    }

    /// Find an icon at the default size and scale.
    pub fn lookup(&self, name: &str) -> Result<Icon, IconError> {
        self.lookup_with_size(name, self.default_size)
    }

    /// Find an icon at `size` and the default scale.
    pub fn lookup_with_size(&self, name: &str, size: u32) -> Result<Icon, IconError> {
        self.find_icon(name, size, self.default_scale)
    }

    /// Find the symbolic variant of `name` at the default size.
    pub fn lookup_symbolic(&self, name: &str) -> Result<Icon, IconError> {
        self.lookup_symbolic_with_size(name, self.default_size)
    }

    pub fn lookup_symbolic_with_size(&self, name: &str, size: u32) -> Result<Icon, IconError> {
        if is_symbolic(name) {
            self.find_icon(name, size, self.default_scale)
        } else {
            self.find_icon(&format!("{name}{SYMBOLIC_SUFFIX}"), size, self.default_scale)
        }
    }

    /// Find an icon with the required size and scale.
    pub fn find_icon(&self, name: &str, size: u32, scale: u32) -> Result<Icon, IconError> {
        self.resolve(&[name], size, scale)
            .ok_or_else(|| IconError::NotFound {
                name: name.to_string(),
            })
    }

    /// Find the first available icon of `names`, in listed order.
    ///
    /// Every candidate is tried in a theme before moving on to its parents,
    /// so an earlier theme always beats an earlier candidate.
    pub fn find_best_icon<S: AsRef<str>>(
        &self,
        names: &[S],
        size: u32,
        scale: u32,
    ) -> Result<Icon, IconError> {
        let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        self.resolve(&names, size, scale)
            .ok_or_else(|| IconError::NoneFound {
                names: names.iter().map(|n| n.to_string()).collect(),
            })
    }

    fn resolve(&self, names: &[&str], size: u32, scale: u32) -> Option<Icon> {
        let names: Vec<&str> = names.iter().copied().filter(|n| !n.is_empty()).collect();
        if names.is_empty() {
            return None;
        }

        // Themes already searched during this call; also guards against
        // inheritance cycles.
        let mut visited = HashSet::new();

        let icon = self
            .search_theme_chain(&names, size, scale, &self.theme, &mut visited)
            .or_else(|| names.iter().find_map(|name| self.lookup_unthemed(name)))
            .or_else(|| {
                let fallback = self.fallback_theme.as_deref()?;
                self.search_theme_chain(&names, size, scale, fallback, &mut visited)
            });

        match &icon {
            Some(icon) => debug!("Resolved {} -> {}", icon.name, icon.path.display()),
            None => debug!("No icon for {:?} at {}@{}", names, size, scale),
        }
        icon
    }

    fn search_theme_chain(
        &self,
        names: &[&str],
        size: u32,
        scale: u32,
        theme: &str,
        visited: &mut HashSet<String>,
    ) -> Option<Icon> {
        if !visited.insert(theme.to_string()) {
            return None;
        }

        let info = match self.themes.get(theme, &self.base_dirs) {
            Ok(info) => info,
            Err(e) => {
                trace!("{}", e);
                return None;
            }
        };

        if let Some(icon) = names
            .iter()
            .find_map(|name| self.lookup_in_theme(name, size, scale, &info))
        {
            return Some(icon);
        }

        info.inherits
            .iter()
            .find_map(|parent| self.search_theme_chain(names, size, scale, parent, visited))
    }

    fn lookup_in_theme(
        &self,
        name: &str,
        size: u32,
        scale: u32,
        info: &ThemeInfo,
    ) -> Option<Icon> {
        // Exact size match first.
        for (subdir, rule) in rules(info) {
            if !rule.matches(size, scale) {
                continue;
            }
            let hit = self
                .candidates(name, info, subdir)
                .find(|(base, path)| self.presence.exists(base, path));
            if let Some((_, path)) = hit {
                return Some(Icon::themed(name, path, rule));
            }
        }

        // Otherwise the closest existing size; ties keep the first found.
        let mut closest: Option<(u32, PathBuf, &SubdirRule)> = None;
        for (subdir, rule) in rules(info) {
            let distance = rule.distance(size, scale);
            for (base, path) in self.candidates(name, info, subdir) {
                if !self.presence.exists(base, &path) {
                    continue;
                }
                if closest.as_ref().is_none_or(|(best, _, _)| distance < *best) {
                    closest = Some((distance, path, rule));
                }
            }
        }

        closest.map(|(_, path, rule)| Icon::themed(name, path, rule))
    }

    /// `<base>/<theme>/<subdir>/<name>.<ext>`, base-directory major.
    fn candidates<'a>(
        &'a self,
        name: &'a str,
        info: &'a ThemeInfo,
        subdir: &'a str,
    ) -> impl Iterator<Item = (&'a Path, PathBuf)> + 'a {
        self.base_dirs.iter().flat_map(move |base| {
            let dir = base.join(&info.name).join(subdir);
            self.extensions
                .iter()
                .map(move |ext| (base.as_path(), dir.join(format!("{name}.{ext}"))))
        })
    }

    /// `<base>/<name>.<ext>` in every base directory.
    fn lookup_unthemed(&self, name: &str) -> Option<Icon> {
        for base in &self.base_dirs {
            for ext in &self.extensions {
                let path = base.join(format!("{name}.{ext}"));
                if self.presence.exists(base, &path) {
                    return Some(Icon::unthemed(name, path));
                }
            }
        }
        None
    }
}

impl Default for IconLookup {
    fn default() -> Self {
        Self::new()
    }
}

fn rules(info: &ThemeInfo) -> impl Iterator<Item = (&str, &SubdirRule)> {
    info.subdirectories()
        .filter_map(|subdir| info.rule(subdir).map(|rule| (subdir, rule)))
}

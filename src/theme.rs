//! Icon theme metadata: `index.theme` parsing, sizing rules and the theme cache.

use crate::error::{DescriptorError, IconError};
use log::{debug, trace};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, PoisonError, RwLock};

/// Theme every other theme implicitly inherits from.
pub const FALLBACK_THEME: &str = "hicolor";

const MAIN_SECTION: &str = "Icon Theme";
const INDEX_FILE: &str = "index.theme";

/// How a theme subdirectory matches requested sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirType {
    Fixed,
    Scalable,
    #[default]
    Threshold,
}

impl DirType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "Fixed" => Some(DirType::Fixed),
            "Scalable" => Some(DirType::Scalable),
            "Threshold" => Some(DirType::Threshold),
            _ => None,
        }
    }
}

/// Sizing contract of one theme subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdirRule {
    pub size: u32,
    pub scale: u32,
    pub kind: DirType,
    pub min_size: u32,
    pub max_size: u32,
    pub threshold: u32,
}

impl SubdirRule {
    /// A rule with the defaults the descriptor format prescribes.
    pub fn new(size: u32) -> Self {
        Self {
            size,
            scale: 1,
            kind: DirType::Threshold,
            min_size: size,
            max_size: size,
            threshold: 2,
        }
    }

    /// Whether an icon from this directory is an exact match for `size`@`scale`.
    pub fn matches(&self, size: u32, scale: u32) -> bool {
        if self.scale != scale {
            return false;
        }

        match self.kind {
            DirType::Fixed => self.size == size,
            DirType::Scalable => self.min_size <= size && size <= self.max_size,
            DirType::Threshold => {
                self.size.saturating_sub(self.threshold) <= size
                    && size <= self.size.saturating_add(self.threshold)
            }
        }
    }

    /// Distance in scaled pixels between this directory and the request.
    /// Zero means the request falls inside the directory's range.
    pub fn distance(&self, size: u32, scale: u32) -> u32 {
        // Products of two u32 values do not fit in i64 once signed.
        let wanted = i128::from(size) * i128::from(scale);
        let scaled = |value: i128| value * i128::from(self.scale);
        let min = scaled(i128::from(self.min_size));
        let max = scaled(i128::from(self.max_size));

        let distance = match self.kind {
            DirType::Fixed => scaled(i128::from(self.size)) - wanted,
            DirType::Scalable => {
                if wanted < min {
                    min - wanted
                } else if wanted > max {
                    wanted - max
                } else {
                    0
                }
            }
            DirType::Threshold => {
                let size = i128::from(self.size);
                let threshold = i128::from(self.threshold);
                if wanted < scaled(size - threshold) {
                    min - wanted
                } else if wanted > scaled(size + threshold) {
                    wanted - max
                } else {
                    0
                }
            }
        };

        u32::try_from(distance.unsigned_abs()).unwrap_or(u32::MAX)
    }
}

/// Metadata of one icon theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeInfo {
    /// Directory name of the theme.
    pub name: String,
    /// Human readable name from the descriptor.
    pub display_name: String,
    pub directories: Vec<String>,
    pub scaled_directories: Vec<String>,
    /// Parent themes in lookup order. Always ends up containing
    /// [`FALLBACK_THEME`] unless this is the fallback theme.
    pub inherits: Vec<String>,
    rules: HashMap<String, SubdirRule>,
}

impl ThemeInfo {
    /// Parse the contents of an `index.theme` file for theme `name`.
    pub fn parse(name: &str, content: &str) -> Result<Self, DescriptorError> {
        let sections = parse_sections(content);
        let main = sections
            .get(MAIN_SECTION)
            .ok_or_else(|| DescriptorError::MissingSection(MAIN_SECTION.to_string()))?;

        let display_name = required(main, MAIN_SECTION, "Name")?.to_string();
        let directories = split_list(required(main, MAIN_SECTION, "Directories")?);
        let scaled_directories = main
            .get("ScaledDirectories")
            .map(|v| split_list(v))
            .unwrap_or_default();

        let mut inherits = main
            .get("Inherits")
            .map(|v| split_list(v))
            .unwrap_or_default();
        if name != FALLBACK_THEME && !inherits.iter().any(|t| t == FALLBACK_THEME) {
            inherits.push(FALLBACK_THEME.to_string());
        }

        let mut rules = HashMap::new();
        for dir in directories.iter().chain(&scaled_directories) {
            let section = sections
                .get(dir.as_str())
                .ok_or_else(|| DescriptorError::MissingSection(dir.clone()))?;
            rules.insert(dir.clone(), parse_rule(dir, section)?);
        }

        Ok(Self {
            name: name.to_string(),
            display_name,
            directories,
            scaled_directories,
            inherits,
            rules,
        })
    }

    /// All subdirectories to search, regular ones first.
    pub fn subdirectories(&self) -> impl Iterator<Item = &str> {
        self.directories
            .iter()
            .chain(&self.scaled_directories)
            .map(String::as_str)
    }

    pub fn rule(&self, subdir: &str) -> Option<&SubdirRule> {
        self.rules.get(subdir)
    }
}

type Section = HashMap<String, String>;

fn parse_sections(content: &str) -> HashMap<String, Section> {
    let mut sections: HashMap<String, Section> = HashMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        if let (Some(section), Some((key, value))) = (&current, line.split_once('=')) {
            if let Some(entries) = sections.get_mut(section) {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    sections
}

fn required<'a>(section: &'a Section, name: &str, key: &str) -> Result<&'a str, DescriptorError> {
    section
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DescriptorError::MissingKey {
            section: name.to_string(),
            key: key.to_string(),
        })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_rule(dir: &str, section: &Section) -> Result<SubdirRule, DescriptorError> {
    let raw_size = required(section, dir, "Size")?;
    let size = raw_size
        .parse::<u32>()
        .map_err(|_| DescriptorError::InvalidValue {
            section: dir.to_string(),
            key: "Size".to_string(),
            value: raw_size.to_string(),
        })?;

    // Optional keys fall back to their defaults when absent or unparsable.
    let int_or = |key: &str, default: u32| {
        section
            .get(key)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default)
    };

    Ok(SubdirRule {
        size,
        scale: int_or("Scale", 1),
        kind: section
            .get("Type")
            .and_then(|v| DirType::parse(v))
            .unwrap_or_default(),
        min_size: int_or("MinSize", size),
        max_size: int_or("MaxSize", size),
        threshold: int_or("Threshold", 2),
    })
}

/// Read and parse one descriptor file.
pub fn load_descriptor(name: &str, index_path: &Path) -> Result<ThemeInfo, IconError> {
    let content = fs::read_to_string(index_path)?;
    ThemeInfo::parse(name, &content).map_err(|reason| IconError::Descriptor {
        path: index_path.to_path_buf(),
        reason,
    })
}

/// Process-lifetime cache of parsed themes, keyed by theme name.
#[derive(Default)]
pub struct ThemeCache {
    themes: RwLock<HashMap<String, Arc<ThemeInfo>>>,
}

impl ThemeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a theme, loading it from the first base directory holding a
    /// usable `index.theme`.
    pub fn get(&self, name: &str, base_dirs: &[PathBuf]) -> Result<Arc<ThemeInfo>, IconError> {
        {
            let themes = self.themes.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(info) = themes.get(name) {
                return Ok(info.clone());
            }
        }

        for base in base_dirs {
            let index_path = base.join(name).join(INDEX_FILE);
            match load_descriptor(name, &index_path) {
                Ok(info) => {
                    debug!(
                        "Loaded theme {} ({} directories) from {}",
                        name,
                        info.rules.len(),
                        index_path.display()
                    );
                    let mut themes = self.themes.write().unwrap_or_else(PoisonError::into_inner);
                    let info = themes
                        .entry(name.to_string())
                        .or_insert_with(|| Arc::new(info));
                    return Ok(info.clone());
                }
                Err(IconError::Io(e)) => {
                    trace!("No theme at {}: {}", index_path.display(), e);
                }
                Err(e) => {
                    debug!("Skipping theme descriptor: {}", e);
                }
            }
        }

        Err(IconError::ThemeNotFound(name.to_string()))
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.themes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

/// Query the desktop's configured icon theme.
///
/// Tries dconf, then gsettings, and falls back to [`FALLBACK_THEME`].
pub fn default_theme() -> String {
    let queries: [(&str, &[&str]); 2] = [
        ("dconf", &["read", "/org/gnome/desktop/interface/icon-theme"]),
        ("gsettings", &["get", "org.gnome.desktop.interface", "icon-theme"]),
    ];

    for (program, args) in queries {
        let Ok(output) = Command::new(program).args(args).output() else {
            continue;
        };
        let theme = clean_setting(&String::from_utf8_lossy(&output.stdout));
        if !theme.is_empty() {
            debug!("Icon theme {} from {}", theme, program);
            return theme;
        }
    }

    FALLBACK_THEME.to_string()
}

/// `'Adwaita'\n` -> `Adwaita`
fn clean_setting(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c| c == '\n' || c == ' ');
    let trimmed = trimmed.strip_suffix('\'').unwrap_or(trimmed);
    trimmed.strip_prefix('\'').unwrap_or(trimmed).to_string()
}

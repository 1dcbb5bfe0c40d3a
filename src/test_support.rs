//! Helpers for building synthetic icon trees in tests.

use std::fs;
use std::path::Path;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Create an empty file, including its parent directories.
pub fn touch(path: &Path) {
    write_file(path, "");
}

/// Write `<base>/<theme>/index.theme` with the given directories.
///
/// Each entry is `(subdir, rule lines)`, e.g. `("48x48/apps", "Size=48\nType=Fixed")`.
pub fn write_theme(base: &Path, theme: &str, inherits: &[&str], dirs: &[(&str, &str)]) {
    let names: Vec<&str> = dirs.iter().map(|(name, _)| *name).collect();
    let mut content = format!("[Icon Theme]\nName={theme}\nDirectories={}\n", names.join(","));
    if !inherits.is_empty() {
        content.push_str(&format!("Inherits={}\n", inherits.join(",")));
    }
    for (name, rule) in dirs {
        content.push_str(&format!("\n[{name}]\n{rule}\n"));
    }
    write_file(&base.join(theme).join("index.theme"), &content);
}

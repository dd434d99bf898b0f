//! Configuration and artifact paths

use std::io;
use std::path::{Path, PathBuf};

/// Name used for the configuration directory
const APP_NAME: &str = "goals-check";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/goals-check/`
/// - macOS: `~/Library/Application Support/goals-check/`
/// - Windows: `%APPDATA%\goals-check\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Ensure the configuration directory exists
pub fn ensure_config_dir() -> io::Result<Option<PathBuf>> {
    if let Some(dir) = config_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(Some(dir))
    } else {
        Ok(None)
    }
}

/// Build a screenshot path inside `dir`
///
/// Spaces and path separators in `name` become underscores so a check name
/// can be used directly as a file stem.
pub fn screenshot_path(dir: &Path, name: &str) -> PathBuf {
    let stem: String = name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    let file = if stem.ends_with(".png") {
        stem
    } else {
        format!("{stem}.png")
    };
    dir.join(file)
}

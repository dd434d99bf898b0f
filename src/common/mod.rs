//! Common utilities shared by every check

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::Config;
pub use error::{Error, Result};

/// Seconds since the unix epoch, used to make sign-up emails unique
pub fn unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Truncate `text` to at most `max` characters, appending an ellipsis
pub fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

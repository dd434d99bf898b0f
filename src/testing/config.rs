//! Browser scenario configuration types
//!
//! Defines the data structures for deserializing YAML browser scenarios.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::{Error, Result};

/// A complete browser scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct BrowserScenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Page to load; falls back to `deployment.url`
    pub url: Option<String>,
    /// Settle delay after load, overriding `timeouts.settle_ms`
    pub settle_ms: Option<u64>,
    /// The sequence of steps to execute
    pub steps: Vec<ScenarioStep>,
}

impl BrowserScenario {
    /// Parse a scenario from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse scenario: {}", e)))
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }
}

fn default_min_length() -> usize {
    50
}

/// A single step in the scenario
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// `#root` inner HTML must be at least `min_length` characters
    ExpectRoot {
        #[serde(default = "default_min_length")]
        min_length: usize,
    },
    /// Text must be visible, optionally waiting up to `timeout` seconds
    ExpectText { text: String, timeout: Option<u64> },
    /// Text must not be visible
    ExpectAbsent { text: String },
    /// Click the first element containing `text`
    ClickText {
        text: String,
        /// Pause after the click in milliseconds
        wait_after_ms: Option<u64>,
    },
    /// Click the first element matching a CSS selector
    ClickSelector { selector: String },
    /// Wait up to `timeout` seconds for text to appear
    WaitForText { text: String, timeout: u64 },
    /// Save a PNG; relative paths land in the screenshot directory
    Screenshot { path: PathBuf },
    /// No uncaught page errors so far
    ExpectNoErrors,
}

impl ScenarioStep {
    /// One-line description for progress output
    pub fn describe(&self) -> String {
        match self {
            ScenarioStep::ExpectRoot { min_length } => {
                format!("expect #root >= {} chars", min_length)
            }
            ScenarioStep::ExpectText { text, .. } => format!("expect text '{}'", text),
            ScenarioStep::ExpectAbsent { text } => format!("expect no text '{}'", text),
            ScenarioStep::ClickText { text, .. } => format!("click '{}'", text),
            ScenarioStep::ClickSelector { selector } => format!("click {}", selector),
            ScenarioStep::WaitForText { text, timeout } => {
                format!("wait for '{}' ({}s)", text, timeout)
            }
            ScenarioStep::Screenshot { path } => format!("screenshot {}", path.display()),
            ScenarioStep::ExpectNoErrors => "expect no page errors".to_string(),
        }
    }
}

//! YAML browser scenarios
//!
//! A scenario names a page and a list of actions and assertions run against
//! it in a headless browser. Assertions are made against the live DOM, not
//! screenshots.

mod config;
mod runner;

pub use config::*;
pub use runner::{resolve_screenshot, run_scenario, ScenarioSuite, TestResult};

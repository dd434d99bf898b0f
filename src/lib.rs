//! goals-check - verification CLI for the Goals Tracker app
//!
//! This library provides the backend clients, browser automation and check
//! suites behind the `goals-check` binary.

pub mod backend;
pub mod browser;
pub mod checks;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use checks::{Report, StepResult};
pub use common::{Config, Error, Result};

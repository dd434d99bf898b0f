//! Check suites
//!
//! Each suite is an independent sequence of backend calls or browser
//! actions. Failures are printed and recorded in the [`Report`]; a suite only
//! returns `Err` when it cannot start at all (e.g. missing configuration).

pub mod acceptance;
pub mod auth;
pub mod auth_config;
pub mod deployment;
pub mod report;
pub mod smoke;
pub mod verification;
pub mod walkthrough;

use std::fmt::Display;

use async_trait::async_trait;
use colored::Colorize;

use crate::common::Result;

pub use report::{Report, StepResult};

/// Width of section rules
const RULE_WIDTH: usize = 80;

/// A named group of checks producing one report
#[async_trait]
pub trait Suite: Send + Sync {
    /// Title printed in the banner and used as the report title
    fn title(&self) -> String;

    /// Run every step, recording outcomes in `report`
    async fn run(&self, report: &mut Report) -> Result<()>;

    /// Lines printed after the summary
    fn footer(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Run a suite with banner and summary
///
/// With `json` the human-readable summary is replaced by the report as JSON
/// on stdout.
pub async fn run_suite(suite: &dyn Suite, json: bool) -> Result<Report> {
    let title = suite.title();
    let mut report = Report::new(title.clone());

    banner(&title);
    suite.run(&mut report).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print_summary();
        let footer = suite.footer();
        if !footer.is_empty() {
            println!();
            for line in footer {
                println!("  {}", line);
            }
        }
        println!("\n{}\n", "=".repeat(RULE_WIDTH));
    }

    Ok(report)
}

/// Print the top-of-run banner
pub fn banner(title: &str) {
    let inner = RULE_WIDTH - 2;
    println!("\n{}", "*".repeat(RULE_WIDTH));
    println!("*{}*", " ".repeat(inner));
    let centered = format!("{:^inner$}", title.to_uppercase(), inner = inner);
    println!("*{}*", centered.bold());
    println!("*{}*", " ".repeat(inner));
    println!("{}", "*".repeat(RULE_WIDTH));
}

/// Print a section header
pub fn section(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("  {}", title.cyan().bold());
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn pass(message: impl Display) {
    println!("  {} {}", "✓".green(), message);
}

pub fn fail(message: impl Display) {
    println!("  {} {}", "✗".red(), message);
}

pub fn warn(message: impl Display) {
    println!("  {} {}", "⚠".yellow(), message);
}

pub fn info(message: impl Display) {
    println!("    {}", message.to_string().dimmed());
}

/// Print a failed operation and pass the result through
///
/// Lets a workflow chain steps with `?` while still reporting which step
/// broke.
pub fn report_err<T>(label: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        fail(format!("{} failed: {}", label, e));
    }
    result
}

/// Email address unique per second for throwaway sign-ups
pub fn unique_email(prefix: &str, domain: &str, timestamp: u64) -> String {
    format!("{}{}@{}", prefix, timestamp, domain)
}

/// Render an optional boolean setting
pub fn yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "true".to_string(),
        Some(false) => "false".to_string(),
        None => "N/A".to_string(),
    }
}

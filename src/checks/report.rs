//! Pass/fail bookkeeping for a check run

use colored::Colorize;
use serde::Serialize;

use crate::common::Result;

/// Outcome of one named step
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepResult {
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered mapping from step name to pass/fail
///
/// Recording a name twice overwrites the earlier outcome but keeps its
/// position.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub steps: Vec<StepResult>,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
        }
    }

    /// Record a step outcome
    pub fn record(&mut self, name: &str, passed: bool) -> bool {
        self.record_with(name, passed, None)
    }

    /// Record a step outcome with a short explanation
    pub fn record_with(&mut self, name: &str, passed: bool, detail: Option<String>) -> bool {
        let result = StepResult {
            name: name.to_string(),
            passed,
            detail,
        };
        match self.steps.iter_mut().find(|s| s.name == name) {
            Some(existing) => *existing = result,
            None => self.steps.push(result),
        }
        passed
    }

    /// Record an `Ok`/`Err` outcome; the error message becomes the detail
    pub fn record_result<T>(&mut self, name: &str, result: &Result<T>) -> bool {
        match result {
            Ok(_) => self.record(name, true),
            Err(e) => self.record_with(name, false, Some(e.to_string())),
        }
    }

    /// Outcome of a recorded step
    pub fn passed(&self, name: &str) -> Option<bool> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.passed)
    }

    /// True when every recorded step passed
    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|s| s.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.passed).count()
    }

    /// Process exit code: 0 when all steps passed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// Print the final summary table
    pub fn print_summary(&self) {
        super::section("FINAL SUMMARY");
        let width = self
            .steps
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0)
            + 1;

        println!();
        for step in &self.steps {
            let label = format!("{}:", step.name);
            let verdict = if step.passed {
                "PASS ✓".green().bold()
            } else {
                "FAIL ✗".red().bold()
            };
            match &step.detail {
                Some(detail) => println!(
                    "  {:width$}  {}  {}",
                    label,
                    verdict,
                    detail.dimmed(),
                    width = width
                ),
                None => println!("  {:width$}  {}", label, verdict, width = width),
            }
        }

        println!();
        if self.all_passed() {
            println!("  {}", "ALL TESTS PASSED".green().bold());
        } else {
            println!(
                "  {} ({} of {} failed)",
                "SOME TESTS FAILED - REVIEW REQUIRED".red().bold(),
                self.failed_count(),
                self.steps.len()
            );
        }
    }
}

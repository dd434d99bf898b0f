//! Scenario runner implementation
//!
//! Executes browser scenarios step by step against one page. The first
//! failing step stops the scenario.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;

use crate::browser::{BrowserSession, PageSession};
use crate::checks::{Report, Suite};
use crate::common::{Config, Error, Result};

use super::config::{BrowserScenario, ScenarioStep};

/// Result of a scenario run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
}

impl TestResult {
    /// Detail line for the report
    pub fn summary(&self) -> String {
        match &self.error {
            Some(e) => format!("step {}/{}: {}", self.steps_run, self.steps_total, e),
            None => format!("{}/{} steps", self.steps_run, self.steps_total),
        }
    }
}

/// Resolve a screenshot path from a scenario
///
/// Relative paths are placed under the configured screenshot directory.
pub fn resolve_screenshot(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

/// Run a parsed scenario in an already-launched browser
pub async fn run_scenario(
    browser: &BrowserSession,
    config: &Config,
    scenario: &BrowserScenario,
    verbose: bool,
) -> Result<TestResult> {
    let steps_total = scenario.steps.len();
    let url = match &scenario.url {
        Some(url) => url.as_str(),
        None => config.deployment_url()?,
    };

    println!(
        "\n{} {}",
        "Running Scenario:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    println!("\n{}", "Loading page...".cyan());
    if verbose {
        println!("  URL: {}", url.dimmed());
    }
    let settle = scenario.settle_ms.map(Duration::from_millis);
    let page = match browser.open(url, settle).await {
        Ok(page) => page,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return Ok(TestResult {
                name: scenario.name.clone(),
                passed: false,
                steps_run: 0,
                steps_total,
                error: Some(e.to_string()),
            });
        }
    };
    println!("  {} Page loaded", "✓".green());

    println!("\n{}", "Steps:".cyan());
    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;
        match execute_step(&page, config, step).await {
            Ok(()) => {
                println!(
                    "  {} Step {}: {}",
                    "✓".green(),
                    step_num,
                    step.describe().dimmed()
                );
            }
            Err(e) => {
                println!("  {} Step {}: {}", "✗".red(), step_num, e);
                return Ok(TestResult {
                    name: scenario.name.clone(),
                    passed: false,
                    steps_run: step_num,
                    steps_total,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        "Scenario Passed".green().bold()
    );

    Ok(TestResult {
        name: scenario.name.clone(),
        passed: true,
        steps_run: steps_total,
        steps_total,
        error: None,
    })
}

/// Execute a single scenario step
async fn execute_step(page: &PageSession, config: &Config, step: &ScenarioStep) -> Result<()> {
    match step {
        ScenarioStep::ExpectRoot { min_length } => {
            let root = page.root_html().await?;
            if root.len() < *min_length {
                return Err(Error::TestAssertion(format!(
                    "#root has {} chars, expected at least {}",
                    root.len(),
                    min_length
                )));
            }
            Ok(())
        }
        ScenarioStep::ExpectText { text, timeout } => match timeout {
            Some(secs) => page.wait_for_text(text, Duration::from_secs(*secs)).await,
            None => {
                if page.has_text(text).await? {
                    Ok(())
                } else {
                    Err(Error::TestAssertion(format!("Text '{}' not found", text)))
                }
            }
        },
        ScenarioStep::ExpectAbsent { text } => {
            let count = page.count_text(text).await?;
            if count > 0 {
                return Err(Error::TestAssertion(format!(
                    "Text '{}' found {} time(s), expected none",
                    text, count
                )));
            }
            Ok(())
        }
        ScenarioStep::ClickText {
            text,
            wait_after_ms,
        } => {
            page.click_text(text).await?;
            if let Some(ms) = wait_after_ms {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            Ok(())
        }
        ScenarioStep::ClickSelector { selector } => page.click_selector(selector).await,
        ScenarioStep::WaitForText { text, timeout } => {
            page.wait_for_text(text, Duration::from_secs(*timeout)).await
        }
        ScenarioStep::Screenshot { path } => {
            let path = resolve_screenshot(&config.browser.screenshot_dir, path);
            page.screenshot_to(&path).await
        }
        ScenarioStep::ExpectNoErrors => {
            let errors = page.page_errors();
            match errors.first() {
                None => Ok(()),
                Some(first) => Err(Error::TestAssertion(format!(
                    "{} page error(s), first: {}",
                    errors.len(),
                    first
                ))),
            }
        }
    }
}

/// `scenario PATH`
pub struct ScenarioSuite<'a> {
    config: &'a Config,
    scenario: BrowserScenario,
    verbose: bool,
}

impl<'a> ScenarioSuite<'a> {
    pub fn load(config: &'a Config, path: &Path, verbose: bool) -> Result<Self> {
        Ok(Self {
            config,
            scenario: BrowserScenario::load(path)?,
            verbose,
        })
    }
}

#[async_trait]
impl Suite for ScenarioSuite<'_> {
    fn title(&self) -> String {
        format!("Scenario: {}", self.scenario.name)
    }

    async fn run(&self, report: &mut Report) -> Result<()> {
        let browser = BrowserSession::launch(self.config).await?;
        let result = run_scenario(&browser, self.config, &self.scenario, self.verbose).await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "closing browser");
        }
        let result = result?;
        report.record_with(&result.name, result.passed, Some(result.summary()));
        Ok(())
    }
}

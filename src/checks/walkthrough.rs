//! Headless demo walkthrough
//!
//! Loads the app, signs in through the demo button, visits the Goals tab, and
//! fails on any uncaught page error along the way.

use async_trait::async_trait;

use super::smoke::url_label;
use super::{fail, info, pass, section, warn, Report, Suite};
use crate::browser::{BrowserSession, PageSession};
use crate::common::{preview, Config, Error, Result};

pub const PAGE_LOAD: &str = "Page Load";
pub const AUTH_SCREEN: &str = "Auth Screen";
pub const DEMO_LOGIN: &str = "Demo Login";
pub const NAVIGATION: &str = "Navigation";
pub const GOALS_SCREEN: &str = "Goals Screen";
pub const NO_PAGE_ERRORS: &str = "No Page Errors";

/// `#root` must exceed this many characters after load
const MIN_ROOT_LENGTH: usize = 100;

pub const DEMO_BUTTON: &str = "Try Demo Account";

/// Text shown once the demo user lands on the diary
pub const SIGNED_IN_MARKERS: [&str; 2] = ["Today", "Diary"];

pub const NAV_ITEMS: [&str; 5] = ["Goals", "Habits", "Calendar", "Statistics", "Profile"];

/// Page errors printed before truncating
const ERROR_LIMIT: usize = 5;

/// Split nav labels into found and missing
pub fn partition_nav<'n>(found: &[bool], items: &[&'n str]) -> (Vec<&'n str>, Vec<&'n str>) {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for (item, hit) in items.iter().zip(found) {
        if *hit {
            present.push(*item);
        } else {
            missing.push(*item);
        }
    }
    (present, missing)
}

/// `walkthrough`
pub struct WalkthroughSuite<'a> {
    config: &'a Config,
    url: String,
}

impl<'a> WalkthroughSuite<'a> {
    pub fn new(config: &'a Config, url: Option<String>) -> Result<Self> {
        let url = match url {
            Some(url) => url,
            None => config.deployment_url()?.to_string(),
        };
        Ok(Self { config, url })
    }

    async fn page_load(&self, page: &PageSession) -> Result<()> {
        let root = page.root_html().await?;
        if root.len() <= MIN_ROOT_LENGTH {
            return Err(Error::TestAssertion(format!(
                "Root empty ({} chars)",
                root.len()
            )));
        }
        pass(format!("Root has content ({} chars)", root.len()));
        Ok(())
    }

    async fn auth_screen(&self, page: &PageSession) -> Result<()> {
        for (text, label) in [("Goals Tracker", "App title"), ("Sign In", "Sign In button")] {
            if page.has_text(text).await? {
                pass(format!("{} found", label));
            } else {
                warn(format!("{} not found", label));
            }
        }
        if !page.has_text(DEMO_BUTTON).await? {
            return Err(Error::TestAssertion(format!("'{}' not found", DEMO_BUTTON)));
        }
        pass("Demo button found");
        Ok(())
    }

    async fn demo_login(&self, page: &PageSession) -> Result<()> {
        page.click_text(DEMO_BUTTON).await?;
        let marker = page
            .wait_for_any_text(&SIGNED_IN_MARKERS, self.config.timeouts.navigation())
            .await?;
        pass(format!("Logged in: '{}' visible", marker));
        let path = page.screenshot("walkthrough_logged_in").await?;
        info(format!("Screenshot: {}", path.display()));
        Ok(())
    }

    async fn navigation(&self, page: &PageSession) -> Result<()> {
        let mut found = Vec::with_capacity(NAV_ITEMS.len());
        for item in NAV_ITEMS {
            found.push(page.has_text(item).await?);
        }
        let (present, missing) = partition_nav(&found, &NAV_ITEMS);
        for item in &present {
            pass(format!("{} tab found", item));
        }
        for item in &missing {
            warn(format!("{} tab not found", item));
        }
        if !present.contains(&"Goals") {
            return Err(Error::TestAssertion("Goals tab not found".to_string()));
        }
        Ok(())
    }

    async fn goals_screen(&self, page: &PageSession) -> Result<()> {
        page.click_text("Goals").await?;
        page.settle().await;
        let path = page.screenshot("walkthrough_goals").await?;
        pass("Goals screen loaded");
        info(format!("Screenshot: {}", path.display()));
        Ok(())
    }

    /// Run the interactive steps in order, stopping at the first failure
    async fn interact(&self, page: &PageSession, report: &mut Report) {
        section("[1/5] Loading page");
        if !outcome(report, PAGE_LOAD, self.page_load(page).await) {
            return;
        }
        section("[2/5] Verifying auth screen");
        if !outcome(report, AUTH_SCREEN, self.auth_screen(page).await) {
            return;
        }
        section("[3/5] Testing demo account login");
        if !outcome(report, DEMO_LOGIN, self.demo_login(page).await) {
            return;
        }
        section("[4/5] Testing navigation");
        if !outcome(report, NAVIGATION, self.navigation(page).await) {
            return;
        }
        section("[5/5] Testing Goals screen");
        outcome(report, GOALS_SCREEN, self.goals_screen(page).await);
    }
}

/// Print and record a step result
fn outcome(report: &mut Report, name: &str, result: Result<()>) -> bool {
    if let Err(e) = &result {
        fail(format!("{}: {}", name, e));
    }
    report.record_result(name, &result)
}

fn check_page_errors(page: &PageSession, report: &mut Report) {
    section("Checking for JavaScript errors");
    let errors = page.page_errors();
    if errors.is_empty() {
        pass("No JavaScript errors");
        report.record(NO_PAGE_ERRORS, true);
        return;
    }
    fail(format!("{} error(s) found", errors.len()));
    for error in errors.iter().take(ERROR_LIMIT) {
        info(preview(error, 100));
    }
    report.record_with(
        NO_PAGE_ERRORS,
        false,
        Some(format!("{} page error(s)", errors.len())),
    );
}

#[async_trait]
impl Suite for WalkthroughSuite<'_> {
    fn title(&self) -> String {
        format!("Production Walkthrough: {}", url_label(&self.url))
    }

    async fn run(&self, report: &mut Report) -> Result<()> {
        let browser = BrowserSession::launch(self.config).await?;

        match browser.open(&self.url, None).await {
            Ok(page) => {
                if let Ok(Some(status)) = page.navigation_status().await {
                    info(format!("Status: {}", status));
                }
                self.interact(&page, report).await;
                check_page_errors(&page, report);
                match page.screenshot("walkthrough_final").await {
                    Ok(path) => info(format!("Final screenshot: {}", path.display())),
                    Err(e) => warn(format!("Final screenshot failed: {}", e)),
                }
            }
            Err(e) => {
                fail(format!("Failed to load page: {}", e));
                report.record_with(PAGE_LOAD, false, Some(e.to_string()));
            }
        }

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "closing browser");
        }
        Ok(())
    }

    fn footer(&self) -> Vec<String> {
        vec![
            format!("URL: {}", self.url),
            format!(
                "Screenshots: {}",
                self.config.browser.screenshot_dir.display()
            ),
        ]
    }
}

//! Headless render check
//!
//! Loads each URL in Chromium, waits for client-side rendering, and passes
//! when `#root` has content and no uncaught page errors were thrown.

use async_trait::async_trait;

use super::{fail, info, pass, section, warn, Report, Suite};
use crate::browser::{BrowserSession, PageSession};
use crate::common::{preview, Config, Result};

/// Below this many characters `#root` is treated as a white screen
pub const MIN_ROOT_LENGTH: usize = 50;

/// Console messages printed per page
const CONSOLE_LIMIT: usize = 20;

/// Visible text that only the rendered app shows
const APP_MARKERS: [&str; 4] = ["Goals Tracker", "Sign In", "Sign Up", "Demo Account"];

/// Whether the rendered page looks like the app rather than a stub
pub fn has_app_content(root_html: &str, body_text: &str) -> bool {
    APP_MARKERS.iter().any(|m| body_text.contains(m))
        || root_html.to_lowercase().contains("goal")
}

/// URL without scheme or trailing slash, for labels and file names
pub fn url_label(url: &str) -> &str {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
}

/// `smoke`
pub struct SmokeSuite<'a> {
    config: &'a Config,
    urls: Vec<String>,
    name: Option<String>,
}

impl<'a> SmokeSuite<'a> {
    pub fn new(config: &'a Config, urls: &[String], name: Option<String>) -> Result<Self> {
        Ok(Self {
            config,
            urls: config.target_urls(urls)?,
            name,
        })
    }

    fn step_name(&self, index: usize, url: &str) -> String {
        match (&self.name, self.urls.len()) {
            (Some(name), 1) => name.clone(),
            (Some(name), _) => format!("{} #{}", name, index + 1),
            (None, _) => url_label(url).to_string(),
        }
    }

    async fn check(&self, browser: &BrowserSession, url: &str, step: &str) -> Result<bool> {
        println!("\n  Loading page...");
        let page = browser.open(url, None).await?;
        match page.navigation_status().await? {
            Some(status) => pass(format!("Page loaded (status: {})", status)),
            None => pass("Page loaded"),
        }

        let rendered = self.check_root(&page).await?;

        let path = page.screenshot(&format!("smoke_{}", step)).await?;
        pass(format!("Screenshot saved: {}", path.display()));

        print_console(&page.console_messages());

        let errors = page.page_errors();
        if errors.is_empty() {
            pass("No JavaScript errors detected");
        } else {
            fail(format!("JavaScript errors found ({})", errors.len()));
            for error in &errors {
                info(error);
            }
        }

        Ok(rendered && errors.is_empty())
    }

    async fn check_root(&self, page: &PageSession) -> Result<bool> {
        let root = page.root_html().await?;
        info(format!("Root content length: {} characters", root.len()));
        if root.len() < MIN_ROOT_LENGTH {
            fail("Root div appears empty or minimal");
            info(format!("Root HTML: {}", preview(&root, 200)));
            return Ok(false);
        }
        pass("Root div has content");

        let body = page.body_text().await?;
        if has_app_content(&root, &body) {
            pass("App content detected");
        } else {
            warn("Expected UI elements not found");
            info(format!("Page text preview: {}", preview(&body, 200)));
        }
        Ok(true)
    }
}

fn print_console(messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    println!("\n  --- Console Messages ({}) ---", messages.len());
    for message in messages.iter().take(CONSOLE_LIMIT) {
        info(message);
    }
    if messages.len() > CONSOLE_LIMIT {
        info(format!("... and {} more messages", messages.len() - CONSOLE_LIMIT));
    }
}

#[async_trait]
impl Suite for SmokeSuite<'_> {
    fn title(&self) -> String {
        "Headless Render Check".to_string()
    }

    async fn run(&self, report: &mut Report) -> Result<()> {
        let browser = BrowserSession::launch(self.config).await?;

        for (index, url) in self.urls.iter().enumerate() {
            let step = self.step_name(index, url);
            section(&format!("Testing: {}", step));
            info(format!("URL: {}", url));
            match self.check(&browser, url, &step).await {
                Ok(passed) => {
                    report.record(&step, passed);
                }
                Err(e) => {
                    fail(format!("Failed to test page: {}", e));
                    report.record_with(&step, false, Some(e.to_string()));
                }
            }
        }

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "closing browser");
        }
        Ok(())
    }

    fn footer(&self) -> Vec<String> {
        vec![format!(
            "Screenshots: {}",
            self.config.browser.screenshot_dir.display()
        )]
    }
}

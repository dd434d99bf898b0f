//! Headless Chromium session
//!
//! One [`BrowserSession`] owns the browser process and its protocol handler
//! task. Pages are opened through [`BrowserSession::open`], which attaches the
//! error and console listeners before navigating.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use super::capture::PageEvents;
use super::script;
use super::wait::{poll_until, wait_until_stable};
use crate::common::paths::screenshot_path;
use crate::common::{Config, Error, Result};

/// Resource count must hold still this long to count as network quiet
const NETWORK_QUIET: Duration = Duration::from_millis(500);

/// Timing and output settings shared by every page of a session
#[derive(Debug, Clone)]
struct PageSettings {
    navigation: Duration,
    settle: Duration,
    poll_interval: Duration,
    screenshot_dir: PathBuf,
}

/// A running headless browser
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    settings: PageSettings,
}

impl BrowserSession {
    /// Launch Chromium with the configured viewport and executable
    pub async fn launch(config: &Config) -> Result<Self> {
        let browser_config = &config.browser;
        let mut builder = BrowserConfig::builder()
            .window_size(browser_config.viewport_width, browser_config.viewport_height)
            .viewport(Viewport {
                width: browser_config.viewport_width,
                height: browser_config.viewport_height,
                ..Default::default()
            })
            .request_timeout(config.timeouts.navigation());
        if browser_config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(exe) = browser_config.resolve_executable()? {
            builder = builder.chrome_executable(exe);
        }
        let launch_config = builder.build().map_err(Error::Browser)?;

        tracing::debug!(
            width = browser_config.viewport_width,
            height = browser_config.viewport_height,
            "launching browser"
        );
        let (browser, mut handler) = Browser::launch(launch_config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler error");
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            settings: PageSettings {
                navigation: config.timeouts.navigation(),
                settle: config.timeouts.settle(),
                poll_interval: config.timeouts.poll_interval(),
                screenshot_dir: browser_config.screenshot_dir.clone(),
            },
        })
    }

    /// Open a new tab, start capturing events, then navigate to `url`
    ///
    /// Returns once the document is complete, the network is quiet, and
    /// `settle` has elapsed.
    pub async fn open(&self, url: &str, settle: Option<Duration>) -> Result<PageSession> {
        let page = self.browser.new_page("about:blank").await?;
        let events = PageEvents::attach(&page).await?;
        let session = PageSession {
            page,
            events,
            settings: self.settings.clone(),
        };
        session.load(url, settle.unwrap_or(self.settings.settle)).await?;
        Ok(session)
    }

    /// Close the browser and stop the handler task
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "waiting for browser exit");
        }
        self.handler.abort();
        closed?;
        Ok(())
    }
}

/// One open page with its captured events
pub struct PageSession {
    page: Page,
    events: PageEvents,
    settings: PageSettings,
}

impl PageSession {
    async fn load(&self, url: &str, settle: Duration) -> Result<()> {
        tracing::debug!(%url, "navigating");
        self.page.goto(url).await?;
        self.wait_ready().await?;
        if let Err(e) = self.wait_network_quiet().await {
            // long-polling apps never go quiet; settle still applies
            tracing::debug!(error = %e, "network did not go quiet");
        }
        tokio::time::sleep(settle).await;
        Ok(())
    }

    async fn evaluate<T: DeserializeOwned>(&self, js: impl Into<String>) -> Result<T> {
        let result = self.page.evaluate(js.into()).await?;
        Ok(result.into_value::<T>()?)
    }

    /// Wait for `document.readyState == "complete"`
    pub async fn wait_ready(&self) -> Result<()> {
        poll_until(
            "document ready",
            self.settings.navigation,
            self.settings.poll_interval,
            move || async move {
                let ready: bool = self.evaluate(script::READY_STATE_COMPLETE).await?;
                Ok(ready.then_some(()))
            },
        )
        .await
    }

    /// Wait until no new resources load for a short quiet period
    pub async fn wait_network_quiet(&self) -> Result<u64> {
        wait_until_stable(
            "network quiet",
            self.settings.navigation,
            self.settings.poll_interval,
            NETWORK_QUIET,
            move || self.evaluate::<u64>(script::RESOURCE_COUNT),
        )
        .await
    }

    /// HTTP status of the main document, `None` when unavailable
    pub async fn navigation_status(&self) -> Result<Option<u16>> {
        let status: u16 = self.evaluate(script::NAVIGATION_STATUS).await?;
        Ok((status != 0).then_some(status))
    }

    /// Inner HTML of `#root`
    pub async fn root_html(&self) -> Result<String> {
        self.evaluate(script::inner_html("#root")).await
    }

    pub async fn body_text(&self) -> Result<String> {
        self.evaluate(script::BODY_TEXT).await
    }

    /// Elements whose visible text contains `text`
    pub async fn count_text(&self, text: &str) -> Result<u64> {
        self.evaluate(script::count_by_text(text)).await
    }

    pub async fn has_text(&self, text: &str) -> Result<bool> {
        Ok(self.count_text(text).await? > 0)
    }

    pub async fn count_selector(&self, selector: &str) -> Result<u64> {
        self.evaluate(script::count_selector(selector)).await
    }

    /// Click the first element containing `text`
    pub async fn click_text(&self, text: &str) -> Result<()> {
        let clicked: bool = self.evaluate(script::click_by_text(text)).await?;
        if !clicked {
            return Err(Error::TestAssertion(format!(
                "No element with text '{}' to click",
                text
            )));
        }
        tracing::debug!(%text, "clicked");
        Ok(())
    }

    pub async fn click_selector(&self, selector: &str) -> Result<()> {
        let clicked: bool = self.evaluate(script::click_selector(selector)).await?;
        if !clicked {
            return Err(Error::TestAssertion(format!(
                "No element matches selector '{}'",
                selector
            )));
        }
        Ok(())
    }

    /// Poll until `text` appears, failing with [`Error::Timeout`]
    pub async fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()> {
        poll_until(
            &format!("text '{}'", text),
            timeout,
            self.settings.poll_interval,
            move || async move { Ok(self.has_text(text).await?.then_some(())) },
        )
        .await
    }

    /// Poll until any of `texts` appears; returns the first one found
    pub async fn wait_for_any_text<'t>(
        &self,
        texts: &[&'t str],
        timeout: Duration,
    ) -> Result<&'t str> {
        poll_until(
            &format!("any of {:?}", texts),
            timeout,
            self.settings.poll_interval,
            move || async move {
                for text in texts {
                    if self.has_text(text).await? {
                        return Ok(Some(*text));
                    }
                }
                Ok(None)
            },
        )
        .await
    }

    /// Sleep for the session's default settle delay
    pub async fn settle(&self) {
        tokio::time::sleep(self.settings.settle).await;
    }

    /// Capture the viewport as `<screenshot_dir>/<name>.png`
    pub async fn screenshot(&self, name: &str) -> Result<PathBuf> {
        let path = screenshot_path(&self.settings.screenshot_dir, name);
        self.screenshot_to(&path).await?;
        Ok(path)
    }

    /// Capture the viewport to an explicit path
    pub async fn screenshot_to(&self, path: &Path) -> Result<()> {
        let png = self
            .page
            .screenshot(ScreenshotParams::builder().build())
            .await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, png).await?;
        tracing::debug!(path = %path.display(), "screenshot saved");
        Ok(())
    }

    /// Uncaught exceptions so far, in arrival order
    pub fn page_errors(&self) -> Vec<String> {
        self.events.errors.snapshot()
    }

    /// Console API messages so far, in arrival order
    pub fn console_messages(&self) -> Vec<String> {
        self.events.console.snapshot()
    }
}

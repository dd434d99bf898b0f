//! Static deployment probe
//!
//! Fetches the deployed HTML over plain HTTP, checks it is served as a real
//! HTML document, follows the bundled JS and CSS references, and checks that
//! the JS bundle points at the expected backend.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use reqwest::header::{HeaderMap, HeaderName, CACHE_CONTROL, CONTENT_TYPE};

use super::{fail, info, pass, section, warn, Report, Suite};
use crate::backend::http_client;
use crate::common::{preview, Config, Error, Result};

/// Browser-like user agent; some static hosts reject unknown agents
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Entry documents at or below this size are treated as error pages
pub const MIN_HTML_BYTES: usize = 100;

/// Asset kinds referenced from the HTML entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Stylesheet,
}

fn script_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"src="(/assets/[^"]+\.js)""#).expect("valid regex"))
}

fn stylesheet_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"href="(/assets/[^"]+\.css)""#).expect("valid regex"))
}

/// First `/assets/...` reference of the given kind
pub fn find_asset(html: &str, kind: AssetKind) -> Option<&str> {
    let re = match kind {
        AssetKind::Script => script_pattern(),
        AssetKind::Stylesheet => stylesheet_pattern(),
    };
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Join an absolute asset path onto the deployment URL
pub fn asset_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// Structural markers of a single-page-app entry document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlFeatures {
    pub has_html_tag: bool,
    pub has_root_div: bool,
    pub has_title: bool,
}

impl HtmlFeatures {
    pub fn inspect(html: &str) -> Self {
        Self {
            has_html_tag: html.contains("<html"),
            has_root_div: html.contains(r#"id="root""#),
            has_title: html.contains("<title>"),
        }
    }
}

/// Whether a `Content-Type` value announces an HTML document
pub fn is_html_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
}

/// Whether an entry document is large enough to be the app rather than an
/// error page
pub fn is_plausible_size(len: usize) -> bool {
    len > MIN_HTML_BYTES
}

/// A fetched resource with the headers the probe reports on
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    pub body: String,
}

impl Fetched {
    fn from_parts(status: u16, headers: &HeaderMap, body: String) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            status,
            content_type: header(CONTENT_TYPE),
            cache_control: header(CACHE_CONTROL),
            body,
        }
    }
}

/// GET `url` and return status, headers and body
async fn fetch(http: &reqwest::Client, url: &str) -> Result<Fetched> {
    tracing::debug!(%url, "fetch");
    let response = http
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .send()
        .await?;
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.text().await?;
    Ok(Fetched::from_parts(status, &headers, body))
}

/// GET `url` and require HTTP 200
pub async fn probe_status(http: &reqwest::Client, url: &str) -> Result<u16> {
    let fetched = fetch(http, url).await?;
    if fetched.status != 200 {
        return Err(Error::unexpected_status("deployment", fetched.status, url));
    }
    Ok(fetched.status)
}

/// `deploy`
pub struct DeploymentSuite {
    http: reqwest::Client,
    urls: Vec<String>,
    marker: Option<String>,
    verbose: bool,
}

impl DeploymentSuite {
    pub fn new(config: &Config, urls: &[String], verbose: bool) -> Result<Self> {
        Ok(Self {
            http: http_client(config.timeouts.request())?,
            urls: config.target_urls(urls)?,
            marker: config.backend_marker(),
            verbose,
        })
    }

    /// Probe one deployment; returns whether every check passed
    async fn probe(&self, url: &str) -> Result<bool> {
        let page = fetch(&self.http, url).await?;
        if page.status != 200 {
            fail(format!("HTML returned HTTP {}", page.status));
            return Ok(false);
        }
        let html = page.body.as_str();
        pass(format!("HTML loaded: {} bytes", html.len()));
        info(format!("Status: {}", page.status));
        if self.verbose {
            println!("\n{}\n", preview(html, 500));
        }

        let mut ok = true;
        info(format!(
            "Content-Type: {}",
            page.content_type.as_deref().unwrap_or("Not set")
        ));
        info(format!(
            "Cache-Control: {}",
            page.cache_control.as_deref().unwrap_or("Not set")
        ));
        if is_html_content_type(page.content_type.as_deref()) {
            pass("Serving HTML content");
        } else {
            fail("Not serving HTML");
            ok = false;
        }
        if is_plausible_size(html.len()) {
            pass("Content size is reasonable");
        } else {
            fail("Content too small (possible error page)");
            ok = false;
        }

        let features = HtmlFeatures::inspect(html);
        for (present, label) in [
            (features.has_html_tag, "HTML tag"),
            (features.has_root_div, "Root div"),
            (features.has_title, "Title tag"),
        ] {
            if present {
                pass(format!("{} found", label));
            } else {
                fail(format!("{} NOT found", label));
            }
        }
        ok &= features.has_root_div;

        match find_asset(html, AssetKind::Script) {
            Some(path) => {
                pass(format!("JS file reference: {}", path));
                ok &= self.check_script(&asset_url(url, path)).await;
            }
            None => {
                fail("No JS file reference found in HTML");
                ok = false;
            }
        }

        if let Some(path) = find_asset(html, AssetKind::Stylesheet) {
            pass(format!("CSS file reference: {}", path));
            match fetch(&self.http, &asset_url(url, path)).await {
                Ok(css) if css.status == 200 => {
                    pass(format!("CSS file loaded: {} bytes", css.body.len()))
                }
                Ok(css) => {
                    fail(format!("CSS returned HTTP {}", css.status));
                    ok = false;
                }
                Err(e) => {
                    fail(format!("Failed to load CSS: {}", e));
                    ok = false;
                }
            }
        }

        Ok(ok)
    }

    async fn check_script(&self, js_url: &str) -> bool {
        let js = match fetch(&self.http, js_url).await {
            Ok(js) if js.status == 200 => js.body,
            Ok(js) => {
                fail(format!("JS returned HTTP {}", js.status));
                return false;
            }
            Err(e) => {
                fail(format!("Failed to load JS: {}", e));
                return false;
            }
        };
        pass(format!("JS file loaded: {} bytes", js.len()));

        match &self.marker {
            Some(marker) if js.contains(marker.as_str()) => {
                pass("Backend URL embedded in JS");
                true
            }
            Some(_) => {
                fail("Backend URL NOT found in JS");
                false
            }
            None => {
                warn("No backend marker configured; skipping bundle check");
                true
            }
        }
    }
}

#[async_trait]
impl Suite for DeploymentSuite {
    fn title(&self) -> String {
        "Deployment Verification".to_string()
    }

    async fn run(&self, report: &mut Report) -> Result<()> {
        for url in &self.urls {
            section(&format!("Testing: {}", url));
            match self.probe(url).await {
                Ok(ok) => {
                    report.record(url, ok);
                }
                Err(e) => {
                    fail(format!("Failed to load page: {}", e));
                    report.record_with(url, false, Some(e.to_string()));
                }
            }
        }
        Ok(())
    }
}

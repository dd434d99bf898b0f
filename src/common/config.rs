//! Configuration file handling
//!
//! Credentials and target URLs come from `config.toml` and may be overridden
//! by `GOALS_*` environment variables. Nothing is embedded in the binary.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Public backend (auth, REST, edge functions)
    #[serde(default)]
    pub backend: BackendConfig,

    /// Management API for project settings
    #[serde(default)]
    pub management: ManagementConfig,

    /// Demo account credentials
    #[serde(default)]
    pub demo: DemoConfig,

    /// Throwaway account settings for sign-up checks
    #[serde(default)]
    pub signup: SignupConfig,

    /// Deployed web application
    #[serde(default)]
    pub deployment: DeploymentConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Public backend endpoint and client key
#[derive(Debug, Deserialize, Default)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://<ref>.supabase.co`
    pub url: Option<String>,
    /// Anonymous client key sent as `apikey`
    pub anon_key: Option<String>,
}

/// Management API settings
#[derive(Debug, Deserialize)]
pub struct ManagementConfig {
    #[serde(default = "default_management_url")]
    pub api_url: String,
    pub project_ref: Option<String>,
    pub access_token: Option<String>,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            api_url: default_management_url(),
            project_ref: None,
            access_token: None,
        }
    }
}

fn default_management_url() -> String {
    "https://api.supabase.com".to_string()
}

/// Demo account credentials
#[derive(Debug, Deserialize, Default)]
pub struct DemoConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Settings for generated sign-up accounts
#[derive(Debug, Deserialize)]
pub struct SignupConfig {
    /// Local-part prefix; a unix timestamp is appended
    #[serde(default = "default_email_prefix")]
    pub email_prefix: String,
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    #[serde(default = "default_signup_password")]
    pub password: String,
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            email_prefix: default_email_prefix(),
            email_domain: default_email_domain(),
            password: default_signup_password(),
        }
    }
}

fn default_email_prefix() -> String {
    "goalscheck".to_string()
}
fn default_email_domain() -> String {
    "example.com".to_string()
}
fn default_signup_password() -> String {
    "check-password-123".to_string()
}

/// Deployed application settings
#[derive(Debug, Deserialize, Default)]
pub struct DeploymentConfig {
    pub url: Option<String>,
    /// String expected in the bundled JS, usually the backend project ref
    pub backend_marker: Option<String>,
}

/// Timeout and delay settings
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// Timeout for each backend or asset HTTP request
    #[serde(default = "default_request")]
    pub request_secs: u64,

    /// Timeout for page navigation and render polling
    #[serde(default = "default_navigation")]
    pub navigation_secs: u64,

    /// Delay after the page is ready so late client errors can surface
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Interval between polls in wait-for-condition loops
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Delay between sign-up and the first sign-in attempt
    #[serde(default = "default_sign_in_delay")]
    pub sign_in_delay_ms: u64,

    /// Delay after the auto-confirm edge function before signing in
    #[serde(default = "default_confirm_propagation")]
    pub confirm_propagation_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_secs: default_request(),
            navigation_secs: default_navigation(),
            settle_ms: default_settle(),
            poll_interval_ms: default_poll_interval(),
            sign_in_delay_ms: default_sign_in_delay(),
            confirm_propagation_ms: default_confirm_propagation(),
        }
    }
}

fn default_request() -> u64 {
    10
}
fn default_navigation() -> u64 {
    30
}
fn default_settle() -> u64 {
    3000
}
fn default_poll_interval() -> u64 {
    250
}
fn default_sign_in_delay() -> u64 {
    1000
}
fn default_confirm_propagation() -> u64 {
    2000
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_secs(self.navigation_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Headless browser settings
#[derive(Debug, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
    /// Chrome/Chromium executable; a bare name is looked up on PATH
    pub executable: Option<String>,
    /// Pass `--no-sandbox` (needed in most containers)
    #[serde(default)]
    pub no_sandbox: bool,
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            executable: None,
            no_sandbox: false,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_viewport_width() -> u32 {
    1280
}
fn default_viewport_height() -> u32 {
    720
}
fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("screenshots")
}

impl BrowserConfig {
    /// Resolve the configured browser executable
    ///
    /// Explicit paths are used as-is; bare names are searched on PATH.
    /// Returns `None` to let the browser launcher auto-detect.
    pub fn resolve_executable(&self) -> Result<Option<PathBuf>> {
        let Some(exe) = &self.executable else {
            return Ok(None);
        };
        let path = Path::new(exe);
        if path.components().count() > 1 || path.is_absolute() {
            return Ok(Some(path.to_path_buf()));
        }
        which::which(exe)
            .map(Some)
            .map_err(|e| Error::Config(format!("Browser executable '{}' not found: {}", exe, e)))
    }
}

impl Config {
    /// Load configuration from `path`, or the default config file
    ///
    /// Returns default configuration if the default file doesn't exist. An
    /// explicitly requested file must exist. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply `GOALS_*` overrides using `lookup` to read variables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        };
        set(&mut self.backend.url, "GOALS_BACKEND_URL");
        set(&mut self.backend.anon_key, "GOALS_ANON_KEY");
        set(&mut self.management.project_ref, "GOALS_PROJECT_REF");
        set(&mut self.management.access_token, "GOALS_MANAGEMENT_TOKEN");
        set(&mut self.demo.email, "GOALS_DEMO_EMAIL");
        set(&mut self.demo.password, "GOALS_DEMO_PASSWORD");
        set(&mut self.deployment.url, "GOALS_DEPLOYMENT_URL");

        if let Some(url) = lookup("GOALS_MANAGEMENT_URL").filter(|v| !v.is_empty()) {
            self.management.api_url = url;
        }
        if let Some(dir) = lookup("GOALS_SCREENSHOT_DIR").filter(|v| !v.is_empty()) {
            self.browser.screenshot_dir = PathBuf::from(dir);
        }
    }

    pub fn backend_url(&self) -> Result<&str> {
        required(&self.backend.url, "backend.url").map(|u| u.trim_end_matches('/'))
    }

    pub fn anon_key(&self) -> Result<&str> {
        required(&self.backend.anon_key, "backend.anon_key")
    }

    pub fn project_ref(&self) -> Result<&str> {
        required(&self.management.project_ref, "management.project_ref")
    }

    pub fn management_token(&self) -> Result<&str> {
        required(&self.management.access_token, "management.access_token")
    }

    /// Whether the management API can be called at all
    pub fn has_management_credentials(&self) -> bool {
        self.management.project_ref.is_some() && self.management.access_token.is_some()
    }

    pub fn demo_credentials(&self) -> Result<(&str, &str)> {
        Ok((
            required(&self.demo.email, "demo.email")?,
            required(&self.demo.password, "demo.password")?,
        ))
    }

    pub fn deployment_url(&self) -> Result<&str> {
        required(&self.deployment.url, "deployment.url")
    }

    /// String the deployed JS bundle must contain
    ///
    /// Defaults to the first host label of the backend URL, which is the
    /// project ref for hosted projects.
    pub fn backend_marker(&self) -> Option<String> {
        if let Some(marker) = &self.deployment.backend_marker {
            return Some(marker.clone());
        }
        let url = self.backend.url.as_deref()?;
        let host = url.split("://").nth(1).unwrap_or(url);
        host.split(['.', '/', ':'])
            .next()
            .filter(|label| !label.is_empty())
            .map(str::to_string)
    }

    /// Target URLs for deployment checks: explicit arguments win
    pub fn target_urls(&self, urls: &[String]) -> Result<Vec<String>> {
        if urls.is_empty() {
            Ok(vec![self.deployment_url()?.to_string()])
        } else {
            Ok(urls.to_vec())
        }
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::MissingSetting(key.to_string()))
}

/// Commented template written by `goals-check init-config`
pub const CONFIG_TEMPLATE: &str = r#"# goals-check configuration
# Every credential can also be supplied through the GOALS_* environment variables.

[backend]
# url = "https://<project-ref>.supabase.co"     # GOALS_BACKEND_URL
# anon_key = "<anon key>"                        # GOALS_ANON_KEY

[management]
# api_url = "https://api.supabase.com"           # GOALS_MANAGEMENT_URL
# project_ref = "<project-ref>"                  # GOALS_PROJECT_REF
# access_token = "<management token>"            # GOALS_MANAGEMENT_TOKEN

[demo]
# email = "demo@example.com"                     # GOALS_DEMO_EMAIL
# password = "<demo password>"                   # GOALS_DEMO_PASSWORD

[signup]
# email_prefix = "goalscheck"
# email_domain = "example.com"
# password = "check-password-123"

[deployment]
# url = "https://<deployment host>"              # GOALS_DEPLOYMENT_URL
# backend_marker = "<project-ref>"

[timeouts]
# request_secs = 10
# navigation_secs = 30
# settle_ms = 3000
# poll_interval_ms = 250
# sign_in_delay_ms = 1000
# confirm_propagation_ms = 2000

[browser]
# viewport_width = 1280
# viewport_height = 720
# executable = "chromium"
# no_sandbox = false
# screenshot_dir = "screenshots"                 # GOALS_SCREENSHOT_DIR
"#;

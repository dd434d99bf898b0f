//! Backend API clients
//!
//! Thin wrappers over the management, auth and REST endpoints. Every
//! operation is one HTTP request; a status outside the operation's accepted
//! set becomes [`Error::UnexpectedStatus`] carrying the response body.

pub mod auth;
pub mod management;
pub mod rest;
pub mod types;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::common::{Config, Error, Result};

pub use auth::AuthClient;
pub use management::ManagementClient;
pub use rest::RestClient;
pub use types::{AuthConfigPatch, AuthSettings, Goal, RowId, Session, SignUpOutcome, Task};

/// Statuses accepted for plain reads and sign-in
pub const STATUS_OK: &[u16] = &[200];
/// Statuses accepted for inserts and sign-up
pub const STATUS_CREATED: &[u16] = &[200, 201];
/// Statuses accepted for updates and logout
pub const STATUS_UPDATED: &[u16] = &[200, 204];

/// Build the shared HTTP client
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("goals-check/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::from)
}

/// Check a response status against the accepted set
///
/// On mismatch the body is read and returned inside the error so the caller
/// can print it.
pub async fn expect_status(
    response: reqwest::Response,
    operation: &str,
    accepted: &[u16],
) -> Result<reqwest::Response> {
    let status = response.status().as_u16();
    if accepted.contains(&status) {
        tracing::debug!(operation, status, "accepted");
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(operation, status, body = %body, "rejected");
    Err(Error::unexpected_status(operation, status, body))
}

/// Read a response body and decode it as JSON
///
/// A malformed body surfaces as [`Error::Json`] rather than a transport error.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await?;
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

/// Auth and REST clients for one backend, sharing an HTTP client
#[derive(Clone)]
pub struct Backend {
    pub auth: AuthClient,
    pub rest: RestClient,
}

impl Backend {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config.timeouts.request())?;
        let url = config.backend_url()?;
        let key = config.anon_key()?;
        Ok(Self {
            auth: AuthClient::new(http.clone(), url, key),
            rest: RestClient::new(http, url, key),
        })
    }
}

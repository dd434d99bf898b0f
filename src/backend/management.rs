//! Management API client for project auth settings

use super::types::{AuthConfigPatch, AuthSettings};
use super::{expect_status, http_client, read_json, STATUS_OK};
use crate::common::{Config, Result};

/// Client for `/v1/projects/{ref}/config/auth`
#[derive(Clone)]
pub struct ManagementClient {
    http: reqwest::Client,
    api_url: String,
    project_ref: String,
    access_token: String,
}

impl ManagementClient {
    pub fn new(http: reqwest::Client, api_url: &str, project_ref: &str, access_token: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            project_ref: project_ref.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            http_client(config.timeouts.request())?,
            &config.management.api_url,
            config.project_ref()?,
            config.management_token()?,
        ))
    }

    fn auth_config_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/config/auth",
            self.api_url, self.project_ref
        )
    }

    /// GET the current auth configuration
    pub async fn get_auth_config(&self) -> Result<AuthSettings> {
        let url = self.auth_config_url();
        tracing::debug!(%url, "get auth config");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = expect_status(response, "get auth config", STATUS_OK).await?;
        read_json(response).await
    }

    /// PATCH the auth configuration, returning the updated settings
    pub async fn patch_auth_config(&self, patch: &AuthConfigPatch) -> Result<AuthSettings> {
        let url = self.auth_config_url();
        tracing::debug!(%url, ?patch, "patch auth config");
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(patch)
            .send()
            .await?;
        let response = expect_status(response, "update auth config", STATUS_OK).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(AuthSettings::default());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

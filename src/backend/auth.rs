//! Auth endpoint client: health, sign-up, sign-in, logout, auto-confirm

use serde_json::{json, Value};

use super::types::{Session, SignUpOutcome};
use super::{expect_status, read_json, STATUS_CREATED, STATUS_OK, STATUS_UPDATED};
use crate::common::Result;

/// Client for `/auth/v1` and the auto-confirm edge function
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// GET `/auth/v1/health`
    pub async fn health(&self) -> Result<Value> {
        let url = self.endpoint("health");
        tracing::debug!(%url, "auth health");
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .send()
            .await?;
        let response = expect_status(response, "auth health", STATUS_OK).await?;
        read_json(response).await
    }

    /// POST `/auth/v1/signup`
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let url = self.endpoint("signup");
        tracing::debug!(%url, email, "sign up");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let response = expect_status(response, "sign up", STATUS_CREATED).await?;
        let body: Value = read_json(response).await?;
        Ok(SignUpOutcome::from_response(&body))
    }

    /// POST `/auth/v1/token?grant_type=password`
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        let url = self.endpoint("token");
        tracing::debug!(%url, email, "sign in");
        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let response = expect_status(response, "sign in", STATUS_OK).await?;
        let body: Value = read_json(response).await?;
        Session::from_token_response(&body)
    }

    /// POST `/auth/v1/logout`; returns the status code
    pub async fn logout(&self, session: &Session) -> Result<u16> {
        let url = self.endpoint("logout");
        tracing::debug!(%url, user_id = %session.user_id, "logout");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let response = expect_status(response, "logout", STATUS_UPDATED).await?;
        Ok(response.status().as_u16())
    }

    /// POST `/functions/v1/auto-confirm-user`
    ///
    /// The edge function marks the account's email as confirmed so a fresh
    /// sign-up can sign in when project-wide auto-confirm is off.
    pub async fn auto_confirm_user(&self, user_id: &str) -> Result<()> {
        let url = format!("{}/functions/v1/auto-confirm-user", self.base_url);
        tracing::debug!(%url, user_id, "auto-confirm");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(&json!({ "user_id": user_id }))
            .send()
            .await?;
        expect_status(response, "auto-confirm", STATUS_OK).await?;
        Ok(())
    }
}

//! REST client for the `goals` table

use serde_json::json;

use super::types::{parse_created_goal, Goal, RowId, Session, Task};
use super::{expect_status, read_json, STATUS_CREATED, STATUS_OK, STATUS_UPDATED};
use crate::common::Result;

/// Client for `/rest/v1/goals`
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Row filter in the REST layer's `column=eq.value` form
pub fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

impl RestClient {
    pub fn new(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn goals_url(&self) -> String {
        format!("{}/rest/v1/goals", self.base_url)
    }

    /// Insert a goal, returning the stored row when the server echoes it
    pub async fn create_goal(&self, session: &Session, goal: &Goal) -> Result<Option<Goal>> {
        let url = self.goals_url();
        tracing::debug!(%url, title = %goal.title, "create goal");
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "return=representation")
            .json(goal)
            .send()
            .await?;
        let response = expect_status(response, "create goal", STATUS_CREATED).await?;
        let body = response.text().await?;
        parse_created_goal(&body)
    }

    /// List goals owned by `user_id`
    pub async fn list_goals(&self, session: &Session, user_id: &str) -> Result<Vec<Goal>> {
        let url = self.goals_url();
        tracing::debug!(%url, user_id, "list goals");
        let response = self
            .http
            .get(&url)
            .query(&[("user_id", eq_filter(user_id))])
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        let response = expect_status(response, "list goals", STATUS_OK).await?;
        read_json(response).await
    }

    /// Replace a goal's task list; returns the status code
    pub async fn update_goal_tasks(
        &self,
        session: &Session,
        goal_id: &RowId,
        tasks: &[Task],
    ) -> Result<u16> {
        let url = self.goals_url();
        tracing::debug!(%url, %goal_id, tasks = tasks.len(), "update goal tasks");
        let response = self
            .http
            .patch(&url)
            .query(&[("id", eq_filter(&goal_id.to_string()))])
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .json(&json!({ "tasks": tasks }))
            .send()
            .await?;
        let response = expect_status(response, "update goal", STATUS_UPDATED).await?;
        Ok(response.status().as_u16())
    }
}

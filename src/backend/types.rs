//! Records exchanged with the backend
//!
//! These mirror the JSON shapes of the auth, REST and management endpoints
//! closely enough for the checks; unknown fields are kept where a record is
//! written back so an update never drops server data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::common::{Error, Result};

/// An authenticated session from a password-grant sign-in
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
    pub email: Option<String>,
    pub refresh_token: Option<String>,
    pub email_confirmed: bool,
}

impl Session {
    /// Parse a `/token?grant_type=password` response body
    ///
    /// Both the access token and the user id must be present and non-empty.
    pub fn from_token_response(body: &Value) -> Result<Self> {
        let operation = "sign in";
        let access_token = non_empty_str(&body["access_token"])
            .ok_or_else(|| Error::missing_field(operation, "access_token"))?;
        let user = &body["user"];
        let user_id = non_empty_str(&user["id"])
            .ok_or_else(|| Error::missing_field(operation, "user.id"))?;

        Ok(Self {
            access_token: access_token.to_string(),
            user_id: user_id.to_string(),
            email: non_empty_str(&user["email"]).map(str::to_string),
            refresh_token: non_empty_str(&body["refresh_token"]).map(str::to_string),
            email_confirmed: !user["email_confirmed_at"].is_null(),
        })
    }
}

/// What a sign-up call reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_id: Option<String>,
    /// A session was issued immediately (auto-confirm is on)
    pub has_session: bool,
    pub email_confirmed: bool,
}

impl SignUpOutcome {
    /// Parse a `/signup` response body
    ///
    /// With auto-confirm the body is a session wrapping `user`; without it
    /// the body is the bare user record.
    pub fn from_response(body: &Value) -> Self {
        let user = if body["user"].is_object() {
            &body["user"]
        } else {
            body
        };
        let has_session = non_empty_str(&body["access_token"]).is_some()
            || body["session"].is_object();

        Self {
            user_id: non_empty_str(&user["id"]).map(str::to_string),
            has_session,
            email_confirmed: !user["email_confirmed_at"].is_null(),
        }
    }
}

/// Goal or task key; integer or uuid depending on the app version that wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{}", id),
            RowId::Text(id) => f.write_str(id),
        }
    }
}

/// A goal row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task>,
}

impl Goal {
    /// A new goal owned by `user_id`, ready to be inserted
    pub fn new(user_id: &str, title: &str, description: &str) -> Self {
        Self {
            id: None,
            user_id: Some(user_id.to_string()),
            title: title.to_string(),
            description: Some(description.to_string()),
            icon: Some("Target".to_string()),
            color: Some("blue".to_string()),
            image_url: Some(String::new()),
            deadline: Some("2025-12-31".to_string()),
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self
    }
}

/// A task inside a goal's `tasks` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RowId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
    /// Fields the client app added that we don't model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(id: i64, text: &str, due_date: &str) -> Self {
        Self {
            id: RowId::Int(id),
            text: text.to_string(),
            due_date: Some(due_date.to_string()),
            is_complete: false,
            extra: Map::new(),
        }
    }
}

/// Parse the body of a goal insert made with `Prefer: return=representation`
///
/// The REST layer returns an array of inserted rows, a single object, or an
/// empty body when representation is not honoured.
pub fn parse_created_goal(body: &str) -> Result<Option<Goal>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Array(rows) => match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        },
        Value::Object(_) => Ok(Some(serde_json::from_value(value)?)),
        _ => Ok(None),
    }
}

/// Auth settings as returned by the management API
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub mailer_autoconfirm: Option<bool>,
    #[serde(default)]
    pub mailer_allow_unverified_email_sign_ins: Option<bool>,
    #[serde(default)]
    pub disable_signup: Option<bool>,
    #[serde(default)]
    pub external_email_enabled: Option<bool>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AuthSettings {
    /// Key settings in display order
    pub fn key_settings(&self) -> [(&'static str, Option<bool>); 4] {
        [
            ("mailer_autoconfirm", self.mailer_autoconfirm),
            (
                "mailer_allow_unverified_email_sign_ins",
                self.mailer_allow_unverified_email_sign_ins,
            ),
            ("disable_signup", self.disable_signup),
            ("external_email_enabled", self.external_email_enabled),
        ]
    }

    /// Whether new accounts are confirmed at sign-up
    pub fn autoconfirm_enabled(&self) -> bool {
        self.mailer_autoconfirm == Some(true)
    }

    /// Whether a fresh, unconfirmed account is expected to sign in
    ///
    /// Either auto-confirm or unverified sign-ins lets it through.
    pub fn unconfirmed_sign_in_allowed(&self) -> bool {
        self.autoconfirm_enabled() || self.mailer_allow_unverified_email_sign_ins == Some(true)
    }
}

/// Partial update for the management auth config
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AuthConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailer_autoconfirm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailer_allow_unverified_email_sign_ins: Option<bool>,
}

impl AuthConfigPatch {
    pub fn autoconfirm(mut self, enabled: bool) -> Self {
        self.mailer_autoconfirm = Some(enabled);
        self
    }

    pub fn allow_unverified_sign_ins(mut self, enabled: bool) -> Self {
        self.mailer_allow_unverified_email_sign_ins = Some(enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

//! Backend client and suite tests against an in-process fake backend
//!
//! The fake serves the management, auth, REST and edge-function routes plus a
//! static site on a loopback port, with just enough behaviour to exercise
//! the clients:
//! 1. Sign-in is refused for unconfirmed users unless auto-confirm or
//!    unverified sign-ins are on
//! 2. Goal rows are scoped to the bearer's user
//! 3. The management API patches the auto-confirm flags
//! 4. The auto-confirm function confirms one user by id

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use goals_check::backend::{
    http_client, AuthClient, AuthConfigPatch, Backend, Goal, ManagementClient, RowId, Task,
};
use goals_check::checks::acceptance::{AcceptanceSuite, DEMO_WORKFLOW, USER_WORKFLOW};
use goals_check::checks::auth::{AuthSuite, HealthCheck};
use goals_check::checks::auth_config::{EnableAutoconfirm, ShowAuthConfig};
use goals_check::checks::deployment::DeploymentSuite;
use goals_check::checks::verification::{VerificationSuite, DEPLOYMENT, NEW_USER_FLOW};
use goals_check::checks::run_suite;
use goals_check::{Config, Error};

const ANON_KEY: &str = "anon-test-key";
const PROJECT_REF: &str = "testproject";
const MGMT_TOKEN: &str = "mgmt-test-token";
const DEMO_EMAIL: &str = "demo@goals.test";
const DEMO_PASSWORD: &str = "demo-password";
const BUNDLE_MARKER: &str = "goalsproject";

const SITE_INDEX: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <title>Goals Tracker</title>
    <script type="module" crossorigin src="/assets/index-test.js"></script>
    <link rel="stylesheet" crossorigin href="/assets/index-test.css">
  </head>
  <body><div id="root"></div></body>
</html>"#;

struct User {
    id: String,
    email: String,
    password: String,
    confirmed: bool,
}

impl User {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "email_confirmed_at": if self.confirmed { json!("2025-01-01T00:00:00Z") } else { Value::Null },
        })
    }
}

#[derive(Default)]
struct FakeBackend {
    autoconfirm: bool,
    allow_unverified: bool,
    users: Vec<User>,
    goals: Vec<Value>,
    next_goal_id: i64,
    logouts: usize,
    confirm_calls: usize,
    /// Backend URL baked into the served JS bundle
    bundle_backend: String,
    site_content_type: String,
}

impl FakeBackend {
    fn with_demo_user() -> Self {
        let mut fake = Self {
            next_goal_id: 1,
            bundle_backend: format!("https://{}.supabase.co", BUNDLE_MARKER),
            site_content_type: "text/html; charset=utf-8".to_string(),
            ..Default::default()
        };
        fake.users.push(User {
            id: "demo-user".to_string(),
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
            confirmed: true,
        });
        fake.insert_goal(json!({ "user_id": "demo-user", "title": "Read more", "tasks": [] }));
        fake
    }

    fn insert_goal(&mut self, mut row: Value) -> Value {
        row["id"] = json!(self.next_goal_id);
        self.next_goal_id += 1;
        self.goals.push(row.clone());
        row
    }

    fn auth_config(&self) -> Value {
        json!({
            "mailer_autoconfirm": self.autoconfirm,
            "mailer_allow_unverified_email_sign_ins": self.allow_unverified,
            "disable_signup": false,
            "external_email_enabled": true,
            "site_url": "http://localhost:3000",
        })
    }
}

type Shared = Arc<Mutex<FakeBackend>>;

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn has_api_key(headers: &HeaderMap) -> bool {
    headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(ANON_KEY)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// User id behind an access token issued by the fake
fn session_user(headers: &HeaderMap) -> Option<String> {
    bearer(headers)?.strip_prefix("token-").map(str::to_string)
}

fn eq_value(params: &HashMap<String, String>, column: &str) -> Option<String> {
    params
        .get(column)?
        .strip_prefix("eq.")
        .map(str::to_string)
}

async fn health(headers: HeaderMap) -> Response {
    if !has_api_key(&headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }
    Json(json!({ "name": "GoTrue", "version": "v2.0.0" })).into_response()
}

async fn sign_up(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_api_key(&headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }
    let mut fake = state.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if fake.users.iter().any(|u| u.email == email) {
        return error(StatusCode::UNPROCESSABLE_ENTITY, json!({ "msg": "User already registered" }));
    }
    let user = User {
        id: format!("user-{}", fake.users.len() + 1),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        confirmed: fake.autoconfirm,
    };
    let response = if fake.autoconfirm {
        json!({
            "access_token": format!("token-{}", user.id),
            "token_type": "bearer",
            "user": user.to_json(),
        })
    } else {
        user.to_json()
    };
    fake.users.push(user);
    Json(response).into_response()
}

async fn token(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_api_key(&headers) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "No API key found in request" }));
    }
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return error(StatusCode::BAD_REQUEST, json!({ "error": "unsupported_grant_type" }));
    }
    let fake = state.lock().unwrap();
    let email = body["email"].as_str();
    let password = body["password"].as_str();
    let Some(user) = fake
        .users
        .iter()
        .find(|u| Some(u.email.as_str()) == email && Some(u.password.as_str()) == password)
    else {
        return error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
        );
    };
    if !user.confirmed && !fake.allow_unverified {
        return error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Email not confirmed" }),
        );
    }
    Json(json!({
        "access_token": format!("token-{}", user.id),
        "refresh_token": format!("refresh-{}", user.id),
        "token_type": "bearer",
        "user": user.to_json(),
    }))
    .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !has_api_key(&headers) || session_user(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "invalid token" }));
    }
    state.lock().unwrap().logouts += 1;
    StatusCode::NO_CONTENT.into_response()
}

async fn create_goal(State(state): State<Shared>, headers: HeaderMap, Json(row): Json<Value>) -> Response {
    let Some(user_id) = session_user(&headers).filter(|_| has_api_key(&headers)) else {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "JWT required" }));
    };
    if row["user_id"].as_str() != Some(user_id.as_str()) {
        return error(StatusCode::FORBIDDEN, json!({ "message": "row-level security violation" }));
    }
    let echo = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("return=representation"));
    let stored = state.lock().unwrap().insert_goal(row);
    if echo {
        (StatusCode::CREATED, Json(json!([stored]))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn list_goals(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let Some(user_id) = session_user(&headers).filter(|_| has_api_key(&headers)) else {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "JWT required" }));
    };
    let wanted = eq_value(&params, "user_id");
    let fake = state.lock().unwrap();
    let rows: Vec<Value> = fake
        .goals
        .iter()
        .filter(|g| g["user_id"].as_str() == Some(user_id.as_str()))
        .filter(|g| wanted.as_deref().map_or(true, |w| g["user_id"].as_str() == Some(w)))
        .cloned()
        .collect();
    Json(Value::Array(rows)).into_response()
}

async fn update_goal(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(user_id) = session_user(&headers).filter(|_| has_api_key(&headers)) else {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "JWT required" }));
    };
    let Some(id) = eq_value(&params, "id").and_then(|id| id.parse::<i64>().ok()) else {
        return error(StatusCode::BAD_REQUEST, json!({ "message": "id filter required" }));
    };
    let mut fake = state.lock().unwrap();
    if let Some(goal) = fake
        .goals
        .iter_mut()
        .find(|g| g["id"] == json!(id) && g["user_id"].as_str() == Some(user_id.as_str()))
    {
        goal["tasks"] = body["tasks"].clone();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn auto_confirm_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_api_key(&headers) || bearer(&headers).as_deref() != Some(ANON_KEY) {
        return error(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid JWT" }));
    }
    let mut fake = state.lock().unwrap();
    fake.confirm_calls += 1;
    let user_id = body["user_id"].as_str();
    match fake.users.iter_mut().find(|u| Some(u.id.as_str()) == user_id) {
        Some(user) => {
            user.confirmed = true;
            Json(json!({ "success": true })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, json!({ "error": "User not found" })),
    }
}

async fn site_index(State(state): State<Shared>) -> Response {
    let content_type = state.lock().unwrap().site_content_type.clone();
    (
        [(CONTENT_TYPE, content_type), (CACHE_CONTROL, "no-cache".to_string())],
        SITE_INDEX,
    )
        .into_response()
}

async fn site_script(State(state): State<Shared>) -> Response {
    let backend = state.lock().unwrap().bundle_backend.clone();
    (
        [(CONTENT_TYPE, "application/javascript")],
        format!("const backendUrl = \"{}\";", backend),
    )
        .into_response()
}

async fn site_stylesheet() -> Response {
    ([(CONTENT_TYPE, "text/css")], "body { margin: 0; }").into_response()
}

fn management_allowed(headers: &HeaderMap, project_ref: &str) -> Option<Response> {
    if bearer(headers).as_deref() != Some(MGMT_TOKEN) {
        return Some(error(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" })));
    }
    if project_ref != PROJECT_REF {
        return Some(error(StatusCode::NOT_FOUND, json!({ "message": "Project not found" })));
    }
    None
}

async fn get_auth_config(
    State(state): State<Shared>,
    Path(project_ref): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(denied) = management_allowed(&headers, &project_ref) {
        return denied;
    }
    Json(state.lock().unwrap().auth_config()).into_response()
}

async fn patch_auth_config(
    State(state): State<Shared>,
    Path(project_ref): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(denied) = management_allowed(&headers, &project_ref) {
        return denied;
    }
    let mut fake = state.lock().unwrap();
    if let Some(enabled) = body["mailer_autoconfirm"].as_bool() {
        fake.autoconfirm = enabled;
    }
    if let Some(enabled) = body["mailer_allow_unverified_email_sign_ins"].as_bool() {
        fake.allow_unverified = enabled;
    }
    Json(fake.auth_config()).into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/v1/health", get(health))
        .route("/auth/v1/signup", post(sign_up))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/logout", post(logout))
        .route("/functions/v1/auto-confirm-user", post(auto_confirm_user))
        .route("/", get(site_index))
        .route("/assets/index-test.js", get(site_script))
        .route("/assets/index-test.css", get(site_stylesheet))
        .route(
            "/rest/v1/goals",
            get(list_goals).post(create_goal).patch(update_goal),
        )
        .route(
            "/v1/projects/{project_ref}/config/auth",
            get(get_auth_config).patch(patch_auth_config),
        )
        .with_state(state)
}

/// Serve a fresh fake backend on a loopback port
async fn spawn_backend(fake: FakeBackend) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(fake));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();
    config.backend.url = Some(base_url.to_string());
    config.backend.anon_key = Some(ANON_KEY.to_string());
    config.management.api_url = base_url.to_string();
    config.management.project_ref = Some(PROJECT_REF.to_string());
    config.management.access_token = Some(MGMT_TOKEN.to_string());
    config.demo.email = Some(DEMO_EMAIL.to_string());
    config.demo.password = Some(DEMO_PASSWORD.to_string());
    config.deployment.url = Some(format!("{}/", base_url));
    config.deployment.backend_marker = Some(BUNDLE_MARKER.to_string());
    config.timeouts.sign_in_delay_ms = 0;
    config.timeouts.confirm_propagation_ms = 0;
    config
}

fn auth_client(base_url: &str, key: &str) -> AuthClient {
    let http = http_client(std::time::Duration::from_secs(5)).unwrap();
    AuthClient::new(http, base_url, key)
}

#[tokio::test]
async fn test_management_client_reads_and_patches_auth_config() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let client = ManagementClient::from_config(&config_for(&url)).unwrap();

    let settings = client.get_auth_config().await.unwrap();
    assert_eq!(settings.mailer_autoconfirm, Some(false));
    assert!(!settings.autoconfirm_enabled());
    assert_eq!(settings.other["site_url"], "http://localhost:3000");

    let patch = AuthConfigPatch::default()
        .autoconfirm(true)
        .allow_unverified_sign_ins(true);
    let updated = client.patch_auth_config(&patch).await.unwrap();
    assert!(updated.autoconfirm_enabled());
    assert_eq!(updated.mailer_allow_unverified_email_sign_ins, Some(true));
    assert!(state.lock().unwrap().autoconfirm);
}

#[tokio::test]
async fn test_management_client_surfaces_status_and_body() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let http = http_client(std::time::Duration::from_secs(5)).unwrap();
    let client = ManagementClient::new(http, &url, PROJECT_REF, "wrong-token");

    let err = client.get_auth_config().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Unauthorized"));
}

#[tokio::test]
async fn test_health_requires_api_key() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;

    let body = auth_client(&url, ANON_KEY).health().await.unwrap();
    assert_eq!(body["name"], "GoTrue");

    let err = auth_client(&url, "bad-key").health().await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 401, .. }));
}

#[tokio::test]
async fn test_sign_in_after_sign_up_follows_autoconfirm() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let auth = auth_client(&url, ANON_KEY);

    let outcome = auth.sign_up("first@goals.test", "pw-123456").await.unwrap();
    assert!(!outcome.has_session);
    assert!(!outcome.email_confirmed);
    assert!(outcome.user_id.is_some());
    let err = auth
        .sign_in_with_password("first@goals.test", "pw-123456")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    state.lock().unwrap().autoconfirm = true;
    let outcome = auth.sign_up("second@goals.test", "pw-123456").await.unwrap();
    assert!(outcome.has_session);
    assert!(outcome.email_confirmed);

    let session = auth
        .sign_in_with_password("second@goals.test", "pw-123456")
        .await
        .unwrap();
    assert_eq!(Some(session.user_id.clone()), outcome.user_id);
    assert!(session.email_confirmed);
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-user-3"));

    assert_eq!(auth.logout(&session).await.unwrap(), 204);
    assert_eq!(state.lock().unwrap().logouts, 1);
}

#[tokio::test]
async fn test_goal_create_list_update_round_trip() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let backend = Backend::from_config(&config_for(&url)).unwrap();
    let session = backend
        .auth
        .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
        .await
        .unwrap();

    let goal = Goal::new(&session.user_id, "Run a marathon", "Train weekly")
        .with_tasks(vec![Task::new(1, "Buy shoes", "2025-11-04")]);
    let created = backend.rest.create_goal(&session, &goal).await.unwrap().unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.title, "Run a marathon");

    let goals = backend.rest.list_goals(&session, &session.user_id).await.unwrap();
    assert_eq!(goals.len(), 2);
    assert!(goals.iter().any(|g| g.id.as_ref() == Some(&id)));

    let mut tasks = created.tasks.clone();
    tasks[0].is_complete = true;
    let status = backend
        .rest
        .update_goal_tasks(&session, &id, &tasks)
        .await
        .unwrap();
    assert_eq!(status, 204);

    let stored = state.lock().unwrap().goals.last().cloned().unwrap();
    assert_eq!(stored["tasks"][0]["isComplete"], true);
    assert_eq!(stored["tasks"][0]["dueDate"], "2025-11-04");
}

#[tokio::test]
async fn test_acceptance_suite_passes_with_autoconfirm() {
    let mut fake = FakeBackend::with_demo_user();
    fake.autoconfirm = true;
    let (url, state) = spawn_backend(fake).await;
    let config = config_for(&url);

    let suite = AcceptanceSuite::new(&config).unwrap();
    let report = run_suite(&suite, true).await.unwrap();

    assert_eq!(report.passed(USER_WORKFLOW), Some(true));
    assert_eq!(report.passed(DEMO_WORKFLOW), Some(true));
    assert_eq!(report.exit_code(), 0);

    let fake = state.lock().unwrap();
    assert_eq!(fake.logouts, 1);
    let goal = fake
        .goals
        .iter()
        .find(|g| g["title"] == "My First Goal")
        .unwrap();
    assert_eq!(goal["tasks"][0]["isComplete"], true);
    assert_eq!(goal["tasks"][1]["isComplete"], false);
}

#[tokio::test]
async fn test_acceptance_suite_fails_without_autoconfirm() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);

    let suite = AcceptanceSuite::new(&config).unwrap();
    let report = run_suite(&suite, true).await.unwrap();

    assert_eq!(report.passed(USER_WORKFLOW), Some(false));
    assert_eq!(report.passed(DEMO_WORKFLOW), Some(true));
    assert_eq!(report.exit_code(), 1);
    let detail = report.steps[0].detail.as_deref().unwrap();
    assert!(detail.contains("HTTP 400"), "{}", detail);
}

#[tokio::test]
async fn test_auth_suite_consistency_holds_when_sign_in_refused() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);

    let suite = AuthSuite::new(&config).unwrap();
    let report = run_suite(&suite, true).await.unwrap();

    assert_eq!(report.passed("Demo Account Login"), Some(true));
    assert_eq!(report.passed("New User Sign Up"), Some(true));
    assert_eq!(report.passed("New User Sign In"), Some(false));
    assert_eq!(report.passed("Goals CRUD Operations"), Some(true));
    assert_eq!(report.passed("Auto-confirm Consistency"), Some(true));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_health_check_suite() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);

    let report = run_suite(&HealthCheck::new(&config).unwrap(), true)
        .await
        .unwrap();
    assert!(report.all_passed());
}

#[tokio::test]
async fn test_auth_suite_consistency_with_unverified_sign_ins() {
    let mut fake = FakeBackend::with_demo_user();
    fake.allow_unverified = true;
    let (url, _state) = spawn_backend(fake).await;
    let config = config_for(&url);

    let suite = AuthSuite::new(&config).unwrap();
    let report = run_suite(&suite, true).await.unwrap();

    assert_eq!(report.passed("New User Sign In"), Some(true));
    assert_eq!(report.passed("Auto-confirm Consistency"), Some(true));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_listing_tolerates_uuid_task_ids() {
    let mut fake = FakeBackend::with_demo_user();
    fake.insert_goal(json!({
        "user_id": "demo-user",
        "title": "Newer client",
        "tasks": [{ "id": "7b0c2a64-1f7e-4a4e-9c1d-2f5d0c9a1b33", "text": "Stretch", "isComplete": false }],
    }));
    let (url, _state) = spawn_backend(fake).await;
    let backend = Backend::from_config(&config_for(&url)).unwrap();
    let session = backend
        .auth
        .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
        .await
        .unwrap();

    let goals = backend.rest.list_goals(&session, &session.user_id).await.unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(
        goals[1].tasks[0].id,
        RowId::Text("7b0c2a64-1f7e-4a4e-9c1d-2f5d0c9a1b33".to_string())
    );

    let report = run_suite(&AuthSuite::new(&config_for(&url)).unwrap(), true)
        .await
        .unwrap();
    assert_eq!(report.passed("Goals CRUD Operations"), Some(true));
}

#[tokio::test]
async fn test_auto_confirm_function_lets_new_account_sign_in() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let auth = auth_client(&url, ANON_KEY);

    let outcome = auth.sign_up("fresh@goals.test", "pw-123456").await.unwrap();
    let user_id = outcome.user_id.unwrap();
    auth.auto_confirm_user(&user_id).await.unwrap();

    let session = auth
        .sign_in_with_password("fresh@goals.test", "pw-123456")
        .await
        .unwrap();
    assert!(session.email_confirmed);

    let err = auth.auto_confirm_user("no-such-user").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(state.lock().unwrap().confirm_calls, 2);
}

#[tokio::test]
async fn test_verify_suite_passes_with_autoconfirm() {
    let mut fake = FakeBackend::with_demo_user();
    fake.autoconfirm = true;
    let (url, state) = spawn_backend(fake).await;
    let config = config_for(&url);

    let suite = VerificationSuite::new(&config, false).unwrap();
    let report = run_suite(&suite, true).await.unwrap();

    assert!(report.all_passed(), "{:?}", report.steps);
    assert_eq!(state.lock().unwrap().confirm_calls, 0);
}

#[tokio::test]
async fn test_verify_suite_confirms_via_function() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);

    let without = run_suite(&VerificationSuite::new(&config, false).unwrap(), true)
        .await
        .unwrap();
    assert_eq!(without.passed(NEW_USER_FLOW), Some(false));
    assert_eq!(without.passed(DEPLOYMENT), Some(true));

    assert_eq!(state.lock().unwrap().confirm_calls, 0);

    // fresh backend: sign-up emails are only unique per second
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);
    let with = run_suite(&VerificationSuite::new(&config, true).unwrap(), true)
        .await
        .unwrap();
    assert!(with.all_passed(), "{:?}", with.steps);
    assert_eq!(with.exit_code(), 0);
    assert_eq!(state.lock().unwrap().confirm_calls, 1);
}

#[tokio::test]
async fn test_show_auth_config_suite() {
    let (url, _state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let client = ManagementClient::from_config(&config_for(&url)).unwrap();

    let report = run_suite(&ShowAuthConfig::new(client), true).await.unwrap();
    assert_eq!(report.passed("Fetch Auth Config"), Some(true));
}

#[tokio::test]
async fn test_enable_autoconfirm_flips_flags() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let client = ManagementClient::from_config(&config_for(&url)).unwrap();

    let report = run_suite(&EnableAutoconfirm::new(client, true), true)
        .await
        .unwrap();
    assert!(report.all_passed(), "{:?}", report.steps);

    let fake = state.lock().unwrap();
    assert!(fake.autoconfirm);
    assert!(fake.allow_unverified);
}

#[tokio::test]
async fn test_enable_autoconfirm_skips_patch_when_read_fails() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let http = http_client(std::time::Duration::from_secs(5)).unwrap();
    let client = ManagementClient::new(http, &url, PROJECT_REF, "wrong-token");

    let report = run_suite(&EnableAutoconfirm::new(client, false), true)
        .await
        .unwrap();
    assert_eq!(report.passed("Fetch Current Config"), Some(false));
    let patch = report
        .steps
        .iter()
        .find(|s| s.name == "Apply Config Patch")
        .unwrap();
    assert!(!patch.passed);
    assert_eq!(patch.detail.as_deref(), Some("skipped"));
    assert!(!state.lock().unwrap().autoconfirm);
}

#[tokio::test]
async fn test_deploy_suite_checks_bundle_marker() {
    let (url, state) = spawn_backend(FakeBackend::with_demo_user()).await;
    let config = config_for(&url);
    let site = config.deployment.url.clone().unwrap();

    let report = run_suite(&DeploymentSuite::new(&config, &[], false).unwrap(), true)
        .await
        .unwrap();
    assert_eq!(report.passed(&site), Some(true));

    state.lock().unwrap().bundle_backend = "https://elsewhere.supabase.co".to_string();
    let report = run_suite(&DeploymentSuite::new(&config, &[], false).unwrap(), true)
        .await
        .unwrap();
    assert_eq!(report.passed(&site), Some(false));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_deploy_suite_requires_html_content_type() {
    let mut fake = FakeBackend::with_demo_user();
    fake.site_content_type = "text/plain".to_string();
    let (url, _state) = spawn_backend(fake).await;
    let config = config_for(&url);

    let report = run_suite(&DeploymentSuite::new(&config, &[], false).unwrap(), true)
        .await
        .unwrap();
    assert!(!report.all_passed());
}

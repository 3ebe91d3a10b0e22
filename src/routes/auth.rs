//! Auth routes: server-hosted login flow, session read, logout.
//!
//! Each request gets its own [`LoginFlow`] wired to in-memory collaborators.
//! What the flow would have done in a browser comes back in the response:
//! cookie writes as `Set-Cookie`, navigation as `navigate_to`, toasts as a
//! list, and the credential mirror as `storage` (or `clear_storage` when the
//! browser must drop it).

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::cancel::CancelToken;
use crate::credentials::{self, MemoryCredentialStore};
use crate::login::{self, LoginDeps, LoginFlow, LoginForm, LoginOutcome};
use crate::navigation::{NavigationRecorder, Notifier, Toast, ToastBuffer};
use crate::session::{self, CookieSessionWriter, Session};
use crate::state::AppState;

// =============================================================================
// COLLABORATORS
// =============================================================================

struct RequestScope {
    credentials: Arc<MemoryCredentialStore>,
    sessions: Arc<CookieSessionWriter>,
    navigator: Arc<NavigationRecorder>,
    toasts: Arc<ToastBuffer>,
}

impl RequestScope {
    fn new(state: &AppState, jar: CookieJar, credentials: MemoryCredentialStore) -> Self {
        Self {
            credentials: Arc::new(credentials),
            sessions: Arc::new(CookieSessionWriter::new(jar, state.config.cookies.clone())),
            navigator: Arc::new(NavigationRecorder::at(&state.gate.login_path)),
            toasts: Arc::new(ToastBuffer::new()),
        }
    }

    fn flow(&self, state: &AppState, redirect: Option<String>) -> LoginFlow {
        let api = ApiClient::new(
            state.http.clone(),
            &state.config.api.base_url,
            self.credentials.clone(),
            self.navigator.clone(),
        )
        .with_login_path(&state.gate.login_path);

        let deps = LoginDeps {
            api: Arc::new(api),
            credentials: self.credentials.clone(),
            sessions: self.sessions.clone(),
            navigator: self.navigator.clone(),
            notifier: self.toasts.clone(),
        };
        LoginFlow::new(deps, redirect)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub navigate_to: Option<String>,
    pub toasts: Vec<Toast>,
    pub storage: BTreeMap<String, String>,
}

/// `POST /api/auth/login`: run one login attempt.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(req): Json<LoginRequest>) -> Response {
    let scope = RequestScope::new(&state, jar, MemoryCredentialStore::new());
    let flow = scope.flow(&state, req.redirect);
    let cancel = CancelToken::new();

    let outcome = flow
        .submit(&LoginForm::new(&req.email, &req.password), &cancel)
        .await;
    let status = match &outcome {
        LoginOutcome::Navigated(_) | LoginOutcome::Failed { redirect: Some(_), .. } => StatusCode::OK,
        LoginOutcome::Failed { redirect: None, .. } => StatusCode::UNAUTHORIZED,
        LoginOutcome::Invalid(e) => {
            scope.toasts.error(&e.to_string());
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LoginOutcome::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };

    let body = LoginResponse {
        navigate_to: scope.navigator.last(),
        toasts: scope.toasts.drain(),
        storage: scope.credentials.snapshot(),
    };
    (status, scope.sessions.jar(), Json(body)).into_response()
}

// =============================================================================
// CHECK
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub navigate_to: Option<String>,
    /// The presented token was rejected; the browser should drop its mirror.
    pub clear_storage: bool,
}

/// `GET /api/auth/check`: on-mount probe of the browser's mirrored token.
pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CheckQuery>,
) -> Json<CheckResponse> {
    let token = bearer_token(&headers);
    let store = token.map_or_else(MemoryCredentialStore::new, MemoryCredentialStore::with_token);
    let scope = RequestScope::new(&state, CookieJar::new(), store);
    let flow = scope.flow(&state, query.redirect);

    let outcome = flow.check_existing(&CancelToken::new()).await;
    tracing::debug!(?outcome, "login page check");

    let clear_storage = token.is_some() && credentials::mirror_token(scope.credentials.as_ref()).is_none();
    Json(CheckResponse { navigate_to: scope.navigator.last(), clear_storage })
}

// =============================================================================
// SESSION / LOGOUT
// =============================================================================

/// `GET /api/session`: decoded session cookie.
pub async fn session(jar: CookieJar) -> Result<Json<Session>, StatusCode> {
    session::read_session(&jar)
        .map(Json)
        .ok_or(StatusCode::UNAUTHORIZED)
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true: the browser drops its credential mirror.
    pub clear_storage: bool,
}

/// `POST /api/auth/logout`: expire both cookies and tell the browser to wipe
/// its mirror. Succeeds without a session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap, jar: CookieJar) -> impl IntoResponse {
    let mirror = bearer_token(&headers).map_or_else(MemoryCredentialStore::new, MemoryCredentialStore::with_token);
    let sessions = CookieSessionWriter::new(jar, state.config.cookies.clone());
    login::logout(&mirror, &sessions);

    let clear_storage = credentials::mirror_token(&mirror).is_none();
    tracing::info!(clear_storage, "session cookies cleared");
    (StatusCode::OK, sessions.into_jar(), Json(LogoutResponse { clear_storage }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

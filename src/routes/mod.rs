//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON endpoints under `/api` host the login flow on the server side
//! (backend-for-frontend). Every other path falls through to the page shell.
//! The route gate wraps the whole router, but only paths in its matcher are
//! evaluated, so the API and auth pages are never redirected.

pub mod auth;
pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::gate::route_gate;
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/check", get(auth::check))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/session", get(auth::session))
        .route("/healthz", get(healthz))
}

/// Full application router: API, gated page shell, request tracing.
pub fn app(state: AppState) -> Router {
    let gate = axum::middleware::from_fn_with_state(state.gate.clone(), route_gate);

    api_routes()
        .fallback(pages::page_shell)
        .layer(gate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

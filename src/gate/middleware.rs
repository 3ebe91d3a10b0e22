//! Axum middleware wrapper around [`GateConfig::evaluate`].

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use super::{GateConfig, GateDecision};
use crate::session;

/// Install with `axum::middleware::from_fn_with_state(gate, route_gate)`.
pub async fn route_gate(State(gate): State<Arc<GateConfig>>, jar: CookieJar, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let session = session::read_session(&jar);

    match gate.evaluate(&path, session.as_ref()) {
        GateDecision::Allow => next.run(req).await,
        GateDecision::RedirectToLogin(to) => {
            tracing::info!(%path, "unauthenticated request to gated route");
            Redirect::temporary(&to).into_response()
        }
        GateDecision::RedirectToFallback(to) => {
            tracing::info!(%path, role = ?session.map(|s| s.role), %to, "role not allowed on gated route");
            Redirect::temporary(&to).into_response()
        }
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;

//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds only immutable configuration and the pooled `reqwest::Client`.
//! Per-login collaborators (credential mirror, cookie writer, navigator,
//! toasts) are built fresh inside each handler, so no mutable state is
//! shared between requests.

use std::sync::Arc;

use crate::api::ApiError;
use crate::config::GatewayConfig;
use crate::gate::GateConfig;

/// Clone is required by Axum; all inner fields are Arc-wrapped or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gate: Arc<GateConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, ApiError> {
        let http = config.api.http_client()?;
        let gate = Arc::new(config.gate.clone());
        Ok(Self { config: Arc::new(config), gate, http })
    }
}

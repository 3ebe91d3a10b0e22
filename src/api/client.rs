//! reqwest client for the job-board REST backend.
//!
//! Every response funnels through [`ApiClient::execute`], which is also the
//! single place a 401 is handled: the credential mirror is wiped and, unless
//! the user is already on an auth page, the navigator is sent to login with
//! the current path preserved.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::AuthApi;
use super::types::{ApiError, ProfileStatus, TokenGrant, UserRecord, parse_error_body};
use crate::credentials::CredentialStore;
use crate::navigation::Navigator;
use crate::paths;

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const IDENTITY_ENDPOINT: &str = "/auth/me";
pub const EMPLOYER_PROFILE_ENDPOINT: &str = "/employers/me/profile";
pub const JOBSEEKER_PROFILE_ENDPOINT: &str = "/jobseekers/me/profile";

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl ApiClient {
    /// `http` is typically the process-wide client from
    /// [`ApiConfig::http_client`](super::config::ApiConfig::http_client).
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
            navigator,
            login_path: paths::LOGIN.to_owned(),
        }
    }

    /// Override the login page used by the 401 redirect.
    #[must_use]
    pub fn with_login_path(mut self, login_path: &str) -> Self {
        login_path.clone_into(&mut self.login_path);
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !status.is_success() {
            let (detail, code) = parse_error_body(&text);
            let err = ApiError::Status { status: status.as_u16(), detail, code };
            if err.is_unauthorized() {
                self.handle_unauthorized();
            }
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| ApiError::ApiParse(e.to_string()))
    }

    fn handle_unauthorized(&self) {
        self.credentials.clear();

        let current = self.navigator.current_path();
        if paths::is_auth_page(&current) || paths::is_within(&current, &self.login_path) {
            tracing::debug!(%current, "401 on auth page; credentials cleared without redirect");
            return;
        }
        tracing::info!(%current, "401 from API; redirecting to login");
        self.navigator
            .navigate(&paths::login_with_redirect(&self.login_path, &current));
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenGrant, ApiError> {
        let request = self
            .http
            .post(self.url(LOGIN_ENDPOINT))
            .form(&[("username", email), ("password", password)]);
        self.execute(request).await
    }

    async fn identity(&self, token: &str) -> Result<UserRecord, ApiError> {
        self.execute(self.http.get(self.url(IDENTITY_ENDPOINT)).bearer_auth(token))
            .await
    }

    async fn employer_profile(&self, token: &str) -> Result<ProfileStatus, ApiError> {
        self.execute(self.http.get(self.url(EMPLOYER_PROFILE_ENDPOINT)).bearer_auth(token))
            .await
    }

    async fn jobseeker_profile(&self, token: &str) -> Result<ProfileStatus, ApiError> {
        self.execute(self.http.get(self.url(JOBSEEKER_PROFILE_ENDPOINT)).bearer_auth(token))
            .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

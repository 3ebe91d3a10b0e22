//! REST backend access for the login flow.
//!
//! DESIGN
//! ======
//! The backend is a fixed external contract. `AuthApi` is the seam the login
//! flow depends on; `ApiClient` is the reqwest implementation, and tests
//! substitute scripted doubles.

pub mod client;
pub mod config;
pub mod types;

use async_trait::async_trait;

pub use client::ApiClient;
pub use config::{ApiConfig, ApiTimeouts};
pub use types::{ApiError, ProfileStatus, TokenGrant, UserRecord};

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a bearer token (form-encoded `username`/`password`).
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenGrant, ApiError>;

    /// "Who am I" for the given token.
    async fn identity(&self, token: &str) -> Result<UserRecord, ApiError>;

    async fn employer_profile(&self, token: &str) -> Result<ProfileStatus, ApiError>;

    async fn jobseeker_profile(&self, token: &str) -> Result<ProfileStatus, ApiError>;
}

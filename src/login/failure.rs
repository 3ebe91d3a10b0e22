//! Login failure taxonomy and the redirects some failures trigger.
//!
//! TRADE-OFFS
//! ==========
//! The backend historically signalled "verify your email" and "upload your
//! CV first" only through human-readable text. An explicit `code` in the
//! error body is authoritative when present; the substring checks remain as
//! the fallback for bodies that carry only a message.

use crate::api::ApiError;
use crate::paths;

const GENERIC_REJECTION: &str = "Login failed. Please check your credentials and try again.";
const MISSING_TOKEN: &str = "Login failed: no access token was returned.";
const IDENTITY_FAILED: &str = "Could not load your account. Please try again.";

pub const CODE_EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";
pub const CODE_CV_REQUIRED: &str = "CV_REQUIRED";
pub const CODE_PROFILE_INCOMPLETE: &str = "PROFILE_INCOMPLETE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// The credential exchange returned an error.
    #[error("credential exchange failed: {0}")]
    Rejected(ApiError),

    /// The exchange succeeded but carried no token.
    #[error("login response did not include an access token")]
    MissingToken,

    /// The identity lookup after a successful exchange failed.
    #[error("identity lookup failed: {0}")]
    Identity(ApiError),
}

/// Where a failed login sends the user instead of just showing a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureRoute {
    VerifyEmail,
    Signup,
}

impl FailureRoute {
    #[must_use]
    pub fn path(self, attempted_email: &str) -> String {
        match self {
            Self::VerifyEmail => paths::verify_email_for(attempted_email),
            Self::Signup => paths::SIGNUP.to_owned(),
        }
    }
}

impl LoginError {
    fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Rejected(e) | Self::Identity(e) => Some(e),
            Self::MissingToken => None,
        }
    }

    /// Toast text: the server's own message when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.api_error().and_then(ApiError::detail) {
            return detail.to_owned();
        }
        match self {
            Self::Rejected(_) => GENERIC_REJECTION,
            Self::MissingToken => MISSING_TOKEN,
            Self::Identity(_) => IDENTITY_FAILED,
        }
        .to_owned()
    }

    #[must_use]
    pub fn failure_route(&self) -> Option<FailureRoute> {
        self.api_error().and_then(classify)
    }
}

/// Map an API error onto a failure redirect, code first.
#[must_use]
pub fn classify(err: &ApiError) -> Option<FailureRoute> {
    match err.code() {
        Some(CODE_EMAIL_NOT_VERIFIED) => Some(FailureRoute::VerifyEmail),
        Some(CODE_CV_REQUIRED | CODE_PROFILE_INCOMPLETE) => Some(FailureRoute::Signup),
        Some(_) => None,
        None => classify_message(err.detail()?),
    }
}

fn classify_message(detail: &str) -> Option<FailureRoute> {
    let lower = detail.to_lowercase();
    if lower.contains("verify your email") {
        Some(FailureRoute::VerifyEmail)
    } else if lower.contains("upload") || lower.contains("cv") {
        Some(FailureRoute::Signup)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "failure_test.rs"]
mod tests;

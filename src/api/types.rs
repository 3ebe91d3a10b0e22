//! Wire types and errors for the REST backend.

use serde::{Deserialize, Deserializer};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP request never produced a response.
    #[error("API request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("API response error: status {status}")]
    Status { status: u16, detail: Option<String>, code: Option<String> },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Human-readable message from the backend, when it sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Machine-readable error code from the backend, when it sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}

/// Pull `detail` (string, list of `{msg}`, or `{message, code}`) or
/// `message` plus an optional `code` out of an error body. Non-JSON bodies
/// yield nothing; the status alone then describes the failure.
#[must_use]
pub fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, None);
    };

    let mut code = value.get("code").and_then(|c| c.as_str()).map(str::to_owned);
    let detail = match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        Some(serde_json::Value::Object(map)) => {
            if code.is_none() {
                code = map.get("code").and_then(|c| c.as_str()).map(str::to_owned);
            }
            map.get("message").and_then(|m| m.as_str()).map(str::to_owned)
        }
        _ => None,
    };
    let detail = detail.or_else(|| value.get("message").and_then(|m| m.as_str()).map(str::to_owned));

    (detail.filter(|d| !d.is_empty()), code)
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Credential-exchange response. The token is optional on the wire so a 2xx
/// without one can be reported as its own failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Authenticated user record from the identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// The part of a profile payload the login flow cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileStatus {
    #[serde(default)]
    pub profile_completed: bool,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

//! Cookie-backed session store.
//!
//! ARCHITECTURE
//! ============
//! Two httpOnly cookies carry the logged-in principal: `session` holds the
//! JSON-encoded claims (`userId`, `email`, `role`, `loginTime`,
//! `profilePicture`) and a second cookie holds the raw bearer token. Both are
//! written only from a server-action context (a response we control) and
//! share the same 30-day max-age.
//!
//! ERROR HANDLING
//! ==============
//! Reading never fails. A cookie that is missing, undecodable, not JSON,
//! missing `userId`/`role`, carrying an unknown role, or older than the TTL
//! reads back as `None`, so every caller fails closed.

use std::fmt;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use percent_encoding::{NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const SESSION_COOKIE_NAME: &str = "session";
pub const DEFAULT_TOKEN_COOKIE_NAME: &str = "auth_token";
pub const SESSION_TTL_DAYS: i64 = 30;

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "EMPLOYER")]
    Employer,
    #[serde(rename = "JOBSEEKER", alias = "JOB_SEEKER")]
    Jobseeker,
}

impl Role {
    /// Parse a backend role string. Accepts the legacy `JOB_SEEKER` spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ADMIN" => Some(Self::Admin),
            "EMPLOYER" => Some(Self::Employer),
            "JOBSEEKER" | "JOB_SEEKER" => Some(Self::Jobseeker),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Employer => "EMPLOYER",
            Self::Jobseeker => "JOBSEEKER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLAIMS
// =============================================================================

/// Wire form of the `session` cookie. Every field is optional on read so a
/// partial cookie parses and is then rejected by validation, not by serde.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_time: Option<i64>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

/// A validated session: `user_id` present and `role` a known [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    /// Unix epoch milliseconds.
    pub login_time: i64,
    pub profile_picture: Option<String>,
}

impl Session {
    /// Validate decoded claims against `now_ms`.
    #[must_use]
    pub fn from_claims(claims: SessionClaims, now_ms: i64) -> Option<Self> {
        let user_id = claims.user_id.filter(|id| !id.trim().is_empty())?;
        let role = claims.role.as_deref().and_then(Role::parse)?;
        let login_time = claims.login_time.unwrap_or(now_ms);
        if now_ms.saturating_sub(login_time) > ttl_millis() {
            return None;
        }
        Some(Self {
            user_id,
            email: claims.email.unwrap_or_default(),
            role,
            login_time,
            profile_picture: claims.profile_picture,
        })
    }
}

fn ttl_millis() -> i64 {
    SESSION_TTL_DAYS * 24 * 60 * 60 * 1000
}

/// Current wall-clock time in unix epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

// =============================================================================
// COOKIE SETTINGS
// =============================================================================

/// Attributes shared by both session cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub token_cookie_name: String,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { token_cookie_name: DEFAULT_TOKEN_COOKIE_NAME.to_owned(), secure: false }
    }
}

impl CookieSettings {
    fn build(&self, name: &str, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build((name.to_owned(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Write the `session` claims cookie and the access-token cookie.
#[must_use]
pub fn create_session(
    jar: CookieJar,
    claims: &SessionClaims,
    token: &str,
    settings: &CookieSettings,
) -> CookieJar {
    let json = match serde_json::to_string(claims) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "session claims failed to serialize; cookie not written");
            return jar;
        }
    };
    let encoded = utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string();
    let max_age = Duration::days(SESSION_TTL_DAYS);

    jar.add(settings.build(SESSION_COOKIE_NAME, encoded, max_age))
        .add(settings.build(&settings.token_cookie_name, token.to_owned(), max_age))
}

/// Decode the `session` cookie. See the module docs for the failure rules.
#[must_use]
pub fn read_session(jar: &CookieJar) -> Option<Session> {
    read_session_at(jar, now_millis())
}

pub(crate) fn read_session_at(jar: &CookieJar, now_ms: i64) -> Option<Session> {
    let raw = jar.get(SESSION_COOKIE_NAME)?.value();
    let claims = decode_claims(raw)?;
    Session::from_claims(claims, now_ms)
}

fn decode_claims(raw: &str) -> Option<SessionClaims> {
    if raw.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    serde_json::from_str(&decoded).ok()
}

/// Raw bearer token from the access-token cookie, if present and non-empty.
#[must_use]
pub fn read_access_token(jar: &CookieJar, settings: &CookieSettings) -> Option<String> {
    jar.get(&settings.token_cookie_name)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Expire both cookies. Safe to call when they were never set.
#[must_use]
pub fn destroy_session(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(settings.build(SESSION_COOKIE_NAME, String::new(), Duration::ZERO))
        .add(settings.build(&settings.token_cookie_name, String::new(), Duration::ZERO))
}

// =============================================================================
// SERVER-ACTION SEAM
// =============================================================================

/// Server-side session writes as seen by the login flow.
///
/// Writes are fire-and-forget: a platform that rejects cookie writes has no
/// error path back to the caller.
pub trait SessionWriter: Send + Sync {
    fn create_session(&self, claims: &SessionClaims, token: &str);
    fn destroy_session(&self);
}

/// Accumulates cookie writes into a jar that a handler returns with its
/// response.
pub struct CookieSessionWriter {
    jar: std::sync::Mutex<CookieJar>,
    settings: CookieSettings,
}

impl CookieSessionWriter {
    #[must_use]
    pub fn new(jar: CookieJar, settings: CookieSettings) -> Self {
        Self { jar: std::sync::Mutex::new(jar), settings }
    }

    /// Consume the writer, yielding the jar with every pending write.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Copy of the jar with every write so far, for writers shared behind an `Arc`.
    #[must_use]
    pub fn jar(&self) -> CookieJar {
        self.jar
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn update(&self, f: impl FnOnce(CookieJar) -> CookieJar) {
        let mut guard = self
            .jar
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let jar = std::mem::replace(&mut *guard, CookieJar::new());
        *guard = f(jar);
    }
}

impl SessionWriter for CookieSessionWriter {
    fn create_session(&self, claims: &SessionClaims, token: &str) {
        self.update(|jar| create_session(jar, claims, token, &self.settings));
    }

    fn destroy_session(&self) {
        self.update(|jar| destroy_session(jar, &self.settings));
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

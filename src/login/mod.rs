//! Login orchestration.
//!
//! ARCHITECTURE
//! ============
//! One `LoginFlow` per page mount. It turns credentials into a session and a
//! landing route:
//!
//! ```text
//! Idle ─► Checking ─► Ready ─► Submitting ─► PostLoginRouting ─► Done
//!            │                     │
//!            └─► Done (redirect)   └─► Failed (toast, maybe redirect)
//! ```
//!
//! Steps within an attempt are strictly sequential: exchange, identity,
//! persist, destination, navigate. Nothing is retried; every failure ends
//! the attempt and waits for the user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session state has two owners: the client credential mirror and the
//! server cookies. This module and [`logout`] are the only writers of both.
//!
//! Every network await races the caller's [`CancelToken`]. Once it fires the
//! flow stops without writing state or navigating.

pub mod destination;
pub mod failure;
pub mod form;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{AuthApi, UserRecord};
use crate::cancel::CancelToken;
use crate::credentials::{self, CredentialStore};
use crate::navigation::{Navigator, Notifier};
use crate::paths;
use crate::session::{SessionClaims, SessionWriter, now_millis};

pub use destination::landing_route;
pub use failure::{FailureRoute, LoginError};
pub use form::{FormError, LoginForm};

const LOGIN_SUCCESS: &str = "Login successful";

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPhase {
    Idle,
    Checking,
    Ready,
    Submitting,
    PostLoginRouting,
    Done,
    Failed,
}

/// Result of the on-mount token probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Show the form.
    Ready,
    /// A valid token was already present; the user was sent here.
    Redirected(String),
    /// The probe already ran for this mount.
    AlreadyChecked,
    Cancelled,
}

/// Result of one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigated(String),
    Failed { error: LoginError, redirect: Option<String> },
    Invalid(FormError),
    Cancelled,
}

/// Collaborators injected into a flow.
#[derive(Clone)]
pub struct LoginDeps {
    pub api: Arc<dyn AuthApi>,
    pub credentials: Arc<dyn CredentialStore>,
    pub sessions: Arc<dyn SessionWriter>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

// =============================================================================
// FLOW
// =============================================================================

pub struct LoginFlow {
    deps: LoginDeps,
    /// Raw `redirect` query parameter of the login page.
    redirect: Option<String>,
    checked: AtomicBool,
    phase: Mutex<LoginPhase>,
}

impl LoginFlow {
    #[must_use]
    pub fn new(deps: LoginDeps, redirect: Option<String>) -> Self {
        Self { deps, redirect, checked: AtomicBool::new(false), phase: Mutex::new(LoginPhase::Idle) }
    }

    #[must_use]
    pub fn phase(&self) -> LoginPhase {
        *self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set_phase(&self, phase: LoginPhase) {
        *self
            .phase
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = phase;
    }

    fn usable_redirect(&self) -> Option<&str> {
        paths::usable_redirect(self.redirect.as_deref())
    }

    /// On-mount probe: if a mirrored token is still valid, skip the form.
    pub async fn check_existing(&self, cancel: &CancelToken) -> CheckOutcome {
        if self.checked.swap(true, Ordering::SeqCst) {
            return CheckOutcome::AlreadyChecked;
        }
        self.set_phase(LoginPhase::Checking);

        let Some(token) = credentials::mirror_token(self.deps.credentials.as_ref()) else {
            self.set_phase(LoginPhase::Ready);
            return CheckOutcome::Ready;
        };
        if let Some(redirect) = self.usable_redirect() {
            tracing::debug!(redirect, "redirect parameter present; showing login form");
            self.set_phase(LoginPhase::Ready);
            return CheckOutcome::Ready;
        }

        let Some(probe) = cancel.run(self.deps.api.identity(&token)).await else {
            return self.check_cancelled();
        };
        let user = match probe {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(error = %e, "stored token rejected; clearing credentials");
                self.deps.credentials.clear();
                self.set_phase(LoginPhase::Ready);
                return CheckOutcome::Ready;
            }
        };

        let Some(destination) = cancel
            .run(landing_route(self.deps.api.as_ref(), &user, &token))
            .await
        else {
            return self.check_cancelled();
        };
        tracing::info!(user_id = %user.id, role = %user.role, %destination, "already logged in");
        self.deps.navigator.navigate(&destination);
        self.set_phase(LoginPhase::Done);
        CheckOutcome::Redirected(destination)
    }

    /// Validate, exchange credentials, persist the session, and navigate.
    pub async fn submit(&self, form: &LoginForm, cancel: &CancelToken) -> LoginOutcome {
        let (email, password) = match form.validate() {
            Ok(fields) => fields,
            Err(e) => return LoginOutcome::Invalid(e),
        };
        self.set_phase(LoginPhase::Submitting);

        let grant = match cancel.run(self.deps.api.authenticate(&email, &password)).await {
            None => return self.submit_cancelled(),
            Some(Ok(grant)) => grant,
            Some(Err(e)) => return self.fail(LoginError::Rejected(e), &email),
        };
        let Some(token) = grant.access_token.filter(|t| !t.is_empty()) else {
            return self.fail(LoginError::MissingToken, &email);
        };

        let user = match cancel.run(self.deps.api.identity(&token)).await {
            None => return self.submit_cancelled(),
            Some(Ok(user)) => user,
            Some(Err(e)) => return self.fail(LoginError::Identity(e), &email),
        };

        self.set_phase(LoginPhase::PostLoginRouting);
        self.persist(&user, &token);

        let destination = if let Some(redirect) = self.usable_redirect() {
            redirect.to_owned()
        } else {
            match cancel
                .run(landing_route(self.deps.api.as_ref(), &user, &token))
                .await
            {
                Some(destination) => destination,
                None => return self.submit_cancelled(),
            }
        };

        tracing::info!(user_id = %user.id, role = %user.role, %destination, "login succeeded");
        self.deps.notifier.success(LOGIN_SUCCESS);
        self.deps.navigator.navigate(&destination);
        self.set_phase(LoginPhase::Done);
        LoginOutcome::Navigated(destination)
    }

    /// A cancelled probe leaves the form usable.
    fn check_cancelled(&self) -> CheckOutcome {
        tracing::debug!("login check cancelled");
        self.set_phase(LoginPhase::Ready);
        CheckOutcome::Cancelled
    }

    /// A cancelled attempt leaves the form usable for another submit.
    fn submit_cancelled(&self) -> LoginOutcome {
        tracing::debug!("login attempt cancelled");
        self.set_phase(LoginPhase::Ready);
        LoginOutcome::Cancelled
    }

    /// Write the client mirror and the server cookies for `user`.
    fn persist(&self, user: &UserRecord, token: &str) {
        credentials::write_mirror(self.deps.credentials.as_ref(), token, &user.id, &user.email, &user.role);
        let claims = SessionClaims {
            user_id: Some(user.id.clone()),
            email: Some(user.email.clone()),
            role: Some(user.role.clone()),
            login_time: Some(now_millis()),
            profile_picture: user.profile_picture.clone(),
        };
        self.deps.sessions.create_session(&claims, token);
    }

    fn fail(&self, error: LoginError, email: &str) -> LoginOutcome {
        tracing::warn!(error = %error, "login attempt failed");
        self.deps.notifier.error(&error.user_message());

        let redirect = error.failure_route().map(|route| route.path(email));
        if let Some(to) = &redirect {
            self.deps.navigator.navigate(to);
        }
        self.set_phase(LoginPhase::Failed);
        LoginOutcome::Failed { error, redirect }
    }
}

/// Clear both session copies. Safe to repeat.
pub fn logout(credentials: &dyn CredentialStore, sessions: &dyn SessionWriter) {
    credentials.clear();
    sessions.destroy_session();
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

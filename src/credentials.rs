//! Client-side credential mirror.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser pages call the REST backend directly, so they keep a copy of the
//! bearer token and identity next to the httpOnly cookies. The two copies are
//! independent caches of the same principal: login writes both, logout and
//! any 401 wipe this one wholesale. Nothing reconciles them otherwise.

use std::collections::BTreeMap;
use std::sync::Mutex;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_ID_KEY: &str = "user_id";
pub const USER_EMAIL_KEY: &str = "user_email";
pub const USER_ROLE_KEY: &str = "user_role";

/// Key-value storage holding the mirrored credentials.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    /// Remove every entry, not just the four credential keys.
    fn clear(&self);
}

/// Process-local store. Used per request by the HTTP handlers, whose
/// contents are handed back to the browser, and as the test double.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a bearer token (e.g. from an `Authorization` header).
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.set(ACCESS_TOKEN_KEY, token);
        store
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Write all four mirror entries after a successful login.
pub fn write_mirror(store: &dyn CredentialStore, token: &str, user_id: &str, email: &str, role: &str) {
    store.set(ACCESS_TOKEN_KEY, token);
    store.set(USER_ID_KEY, user_id);
    store.set(USER_EMAIL_KEY, email);
    store.set(USER_ROLE_KEY, role);
}

/// The mirrored bearer token, ignoring empty values.
#[must_use]
pub fn mirror_token(store: &dyn CredentialStore) -> Option<String> {
    store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

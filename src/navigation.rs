//! Navigation and toast seams.
//!
//! The login flow and the API client's 401 handling never touch a browser
//! directly. They report "go to this path" and "show this message" through
//! these traits. The recording implementations capture both so an HTTP
//! handler can hand them back to the page in its response.

use std::sync::Mutex;

use serde::Serialize;

pub trait Navigator: Send + Sync {
    /// Path of the page the user is currently on.
    fn current_path(&self) -> String;
    fn navigate(&self, to: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn error(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Error, message: message.to_owned() });
    }

    fn success(&self, message: &str) {
        self.notify(Toast { level: ToastLevel::Success, message: message.to_owned() });
    }
}

/// Navigator that remembers where it was sent instead of going there.
/// The last navigation wins.
#[derive(Debug)]
pub struct NavigationRecorder {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl NavigationRecorder {
    #[must_use]
    pub fn at(current: &str) -> Self {
        Self { current: Mutex::new(current.to_owned()), history: Mutex::new(Vec::new()) }
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        lock(&self.history).last().cloned()
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl Navigator for NavigationRecorder {
    fn current_path(&self) -> String {
        lock(&self.current).clone()
    }

    fn navigate(&self, to: &str) {
        tracing::debug!(to, "navigate");
        *lock(&self.current) = to.to_owned();
        lock(&self.history).push(to.to_owned());
    }
}

#[derive(Debug, Default)]
pub struct ToastBuffer {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *lock(&self.toasts))
    }
}

impl Notifier for ToastBuffer {
    fn notify(&self, toast: Toast) {
        lock(&self.toasts).push(toast);
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;

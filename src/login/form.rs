//! Login form input and client-side validation.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password is required")]
    MissingPassword,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self { email: email.to_owned(), password: password.to_owned() }
    }

    /// Trimmed email and the password exactly as typed.
    ///
    /// # Errors
    ///
    /// Email problems are reported before password problems.
    pub fn validate(&self) -> Result<(String, String), FormError> {
        let email = normalize_email(&self.email).ok_or(FormError::InvalidEmail)?;
        if self.password.is_empty() {
            return Err(FormError::MissingPassword);
        }
        Ok((email, self.password.clone()))
    }
}

/// `local@domain.tld` shape check. No lowercasing: the backend owns identity.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = trimmed.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }
    let dot_inside = domain
        .find('.')
        .is_some_and(|i| i > 0 && i < domain.len() - 1);
    if !dot_inside || domain.ends_with('.') {
        return None;
    }
    Some(trimmed.to_owned())
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;

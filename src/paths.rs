//! Well-known page paths and redirect URL helpers.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const ROOT: &str = "/";
pub const LOGIN: &str = "/login";
pub const SIGNUP: &str = "/signup";
pub const VERIFY_EMAIL: &str = "/verify-email";
pub const EMPLOYER_COMPLETE_REGISTRATION: &str = "/employer/complete-registration";
pub const EMPLOYER_PROFILE: &str = "/employer/profile";
pub const JOBSEEKER_UPLOAD_CV: &str = "/jobseeker/upload-cv";
pub const JOBSEEKER_PROFILE: &str = "/jobseeker/profile";

/// Pages a 401 must never bounce away from (would loop back to login).
const AUTH_PAGES: &[&str] = &[LOGIN, SIGNUP, VERIFY_EMAIL, "/forgot-password", "/reset-password"];

/// Everything but unreserved characters, matching browser component encoding.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single query parameter value. `/` becomes `%2F`.
#[must_use]
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

/// `<login_path>?redirect=<encoded path>`.
#[must_use]
pub fn login_with_redirect(login_path: &str, original: &str) -> String {
    format!("{login_path}?redirect={}", encode_query_value(original))
}

/// Email-verification page pre-filled with the address the user tried.
#[must_use]
pub fn verify_email_for(email: &str) -> String {
    format!("{VERIFY_EMAIL}?email={}", encode_query_value(email))
}

/// True for login/signup/verification pages and anything below them.
#[must_use]
pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.iter().any(|page| is_within(path, page))
}

/// True when `path` (query ignored) is `page` or below it.
#[must_use]
pub fn is_within(path: &str, page: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path == page
        || path
            .strip_prefix(page)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// A `redirect` query value worth honoring: non-empty, not root, not the
/// literal `"null"` some clients serialize for a missing value.
#[must_use]
pub fn usable_redirect(redirect: Option<&str>) -> Option<&str> {
    redirect
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != ROOT && *r != "null")
}

#[cfg(test)]
#[path = "paths_test.rs"]
mod tests;

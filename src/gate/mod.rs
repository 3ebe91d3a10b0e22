//! Route gate: cookie-only authentication and role checks for page routes.
//!
//! DESIGN
//! ======
//! Evaluation is a pure function of the request path and the decoded session
//! cookie. No network call is made, so the gate is cheap enough to run on
//! every matching request. Only paths covered by `matcher` are evaluated;
//! everything else passes through regardless of the rule table.
//!
//! Rules are matched by plain string prefix in declaration order and the
//! first match governs.

pub mod middleware;

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::paths;
use crate::session::{Role, Session};

pub use middleware::route_gate;

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteAccessRule {
    pub route_prefix: String,
    #[serde(default)]
    pub auth_only: bool,
    /// Empty means any authenticated role.
    #[serde(default)]
    pub available_for: Vec<Role>,
}

impl RouteAccessRule {
    #[must_use]
    pub fn new(route_prefix: &str, auth_only: bool, available_for: &[Role]) -> Self {
        Self { route_prefix: route_prefix.to_owned(), auth_only, available_for: available_for.to_vec() }
    }

    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.route_prefix)
    }

    fn denies(&self, role: Role) -> bool {
        self.auth_only && !self.available_for.is_empty() && !self.available_for.contains(&role)
    }
}

/// A path pattern the gate runs on. `/x/:path*` covers `/x` and everything
/// below it; any other pattern must match exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_suffix("/:path*") {
            Some(base) => Self::Subtree(base.to_owned()),
            None => Self::Exact(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Subtree(base) => {
                path == base
                    || path
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

impl<'de> Deserialize<'de> for PathPattern {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GateConfigError {
    #[error("failed to read access rules {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse access rules: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub matcher: Vec<PathPattern>,
    pub rules: Vec<RouteAccessRule>,
    pub role_fallbacks: BTreeMap<Role, String>,
    pub default_fallback: Option<String>,
    pub login_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            matcher: ["/dashboard/:path*", "/employer/:path*", "/jobseeker/:path*", "/jobs"]
                .into_iter()
                .map(PathPattern::parse)
                .collect(),
            rules: vec![
                RouteAccessRule::new("/dashboard", true, &[Role::Admin]),
                RouteAccessRule::new("/employer", true, &[Role::Employer]),
                RouteAccessRule::new("/jobseeker", true, &[Role::Jobseeker]),
                RouteAccessRule::new("/jobs", true, &[]),
            ],
            role_fallbacks: BTreeMap::from([
                (Role::Admin, "/dashboard".to_owned()),
                (Role::Employer, paths::EMPLOYER_PROFILE.to_owned()),
                (Role::Jobseeker, paths::JOBSEEKER_PROFILE.to_owned()),
            ]),
            default_fallback: None,
            login_path: paths::LOGIN.to_owned(),
        }
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    RedirectToLogin(String),
    RedirectToFallback(String),
}

impl GateConfig {
    /// Parse a YAML rule file. Omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or names an unknown role.
    pub fn from_yaml(yaml: &str) -> Result<Self, GateConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, GateConfigError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|source| GateConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_yaml(&yaml)
    }

    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        self.matcher.iter().any(|p| p.matches(path))
    }

    /// First rule whose prefix matches `path`, in declaration order.
    #[must_use]
    pub fn rule_for(&self, path: &str) -> Option<&RouteAccessRule> {
        self.rules.iter().find(|r| r.matches(path))
    }

    #[must_use]
    pub fn fallback_for(&self, role: Role) -> &str {
        self.role_fallbacks
            .get(&role)
            .or(self.default_fallback.as_ref())
            .map_or(paths::ROOT, String::as_str)
    }

    /// Decide what happens to a request for `path` carrying `session`.
    #[must_use]
    pub fn evaluate(&self, path: &str, session: Option<&Session>) -> GateDecision {
        if !self.applies_to(path) {
            return GateDecision::Allow;
        }
        let Some(rule) = self.rule_for(path) else {
            return GateDecision::Allow;
        };
        let Some(session) = session else {
            return GateDecision::RedirectToLogin(paths::login_with_redirect(&self.login_path, path));
        };
        if rule.denies(session.role) {
            return GateDecision::RedirectToFallback(self.fallback_for(session.role).to_owned());
        }
        GateDecision::Allow
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

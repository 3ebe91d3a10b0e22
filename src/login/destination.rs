//! Post-login landing route.
//!
//! Employers and jobseekers land on onboarding until their profile is
//! complete. The two roles disagree on what a failed profile fetch means:
//! an employer is sent to onboarding, a jobseeker to the profile page.

use crate::api::{ApiError, AuthApi, ProfileStatus, UserRecord};
use crate::paths;
use crate::session::Role;

/// Probe profile completeness where the role needs it and pick the landing page.
pub async fn landing_route(api: &dyn AuthApi, user: &UserRecord, token: &str) -> String {
    match Role::parse(&user.role) {
        Some(Role::Employer) => employer_landing(&api.employer_profile(token).await).to_owned(),
        Some(Role::Jobseeker) => jobseeker_landing(&api.jobseeker_profile(token).await).to_owned(),
        Some(Role::Admin) | None => paths::ROOT.to_owned(),
    }
}

#[must_use]
pub fn employer_landing(profile: &Result<ProfileStatus, ApiError>) -> &'static str {
    match profile {
        Ok(status) if status.profile_completed => paths::EMPLOYER_PROFILE,
        Ok(_) => paths::EMPLOYER_COMPLETE_REGISTRATION,
        Err(e) => {
            tracing::warn!(error = %e, "employer profile fetch failed; assuming incomplete");
            paths::EMPLOYER_COMPLETE_REGISTRATION
        }
    }
}

#[must_use]
pub fn jobseeker_landing(profile: &Result<ProfileStatus, ApiError>) -> &'static str {
    match profile {
        Ok(status) if !status.profile_completed => paths::JOBSEEKER_UPLOAD_CV,
        Ok(_) => paths::JOBSEEKER_PROFILE,
        Err(e) => {
            tracing::warn!(error = %e, "jobseeker profile fetch failed; assuming complete");
            paths::JOBSEEKER_PROFILE
        }
    }
}

#[cfg(test)]
#[path = "destination_test.rs"]
mod tests;

use super::*;
use crate::api::{ApiError, ProfileStatus, TokenGrant};
use crate::credentials::{ACCESS_TOKEN_KEY, MemoryCredentialStore, USER_ROLE_KEY};
use crate::navigation::{NavigationRecorder, ToastBuffer, ToastLevel};
use tokio::time::{Duration, sleep, timeout};

// =========================================================================
// ScriptedApi
// =========================================================================

struct ScriptedApi {
    grant: Result<TokenGrant, ApiError>,
    identity: Result<UserRecord, ApiError>,
    employer: Result<ProfileStatus, ApiError>,
    jobseeker: Result<ProfileStatus, ApiError>,
    stall_identity: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn for_role(role: &str) -> Self {
        Self {
            grant: Ok(TokenGrant { access_token: Some("tok".into()) }),
            identity: Ok(user("1", "a@b.com", role)),
            employer: Ok(ProfileStatus { profile_completed: true }),
            jobseeker: Ok(ProfileStatus { profile_completed: true }),
            stall_identity: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }
}

#[async_trait::async_trait]
impl AuthApi for ScriptedApi {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<TokenGrant, ApiError> {
        self.record(&format!("authenticate:{email}"));
        self.grant.clone()
    }

    async fn identity(&self, token: &str) -> Result<UserRecord, ApiError> {
        self.record(&format!("identity:{token}"));
        if self.stall_identity {
            std::future::pending::<()>().await;
        }
        self.identity.clone()
    }

    async fn employer_profile(&self, _token: &str) -> Result<ProfileStatus, ApiError> {
        self.record("employer_profile");
        self.employer.clone()
    }

    async fn jobseeker_profile(&self, _token: &str) -> Result<ProfileStatus, ApiError> {
        self.record("jobseeker_profile");
        self.jobseeker.clone()
    }
}

// =========================================================================
// RecordingSessions
// =========================================================================

#[derive(Default)]
struct RecordingSessions {
    created: Mutex<Vec<(SessionClaims, String)>>,
    destroyed: Mutex<usize>,
}

impl SessionWriter for RecordingSessions {
    fn create_session(&self, claims: &SessionClaims, token: &str) {
        self.created.lock().unwrap().push((claims.clone(), token.to_owned()));
    }

    fn destroy_session(&self) {
        *self.destroyed.lock().unwrap() += 1;
    }
}

// =========================================================================
// Harness
// =========================================================================

fn user(id: &str, email: &str, role: &str) -> UserRecord {
    UserRecord { id: id.into(), email: email.into(), role: role.into(), profile_picture: None }
}

fn rejected(detail: &str) -> ApiError {
    ApiError::Status { status: 401, detail: Some(detail.into()), code: None }
}

struct Harness {
    flow: LoginFlow,
    api: Arc<ScriptedApi>,
    store: Arc<MemoryCredentialStore>,
    sessions: Arc<RecordingSessions>,
    nav: Arc<NavigationRecorder>,
    toasts: Arc<ToastBuffer>,
}

fn harness_with_store(api: ScriptedApi, redirect: Option<&str>, store: MemoryCredentialStore) -> Harness {
    let api = Arc::new(api);
    let store = Arc::new(store);
    let sessions = Arc::new(RecordingSessions::default());
    let nav = Arc::new(NavigationRecorder::at(paths::LOGIN));
    let toasts = Arc::new(ToastBuffer::new());
    let deps = LoginDeps {
        api: api.clone(),
        credentials: store.clone(),
        sessions: sessions.clone(),
        navigator: nav.clone(),
        notifier: toasts.clone(),
    };
    Harness { flow: LoginFlow::new(deps, redirect.map(str::to_owned)), api, store, sessions, nav, toasts }
}

fn harness(api: ScriptedApi, redirect: Option<&str>) -> Harness {
    harness_with_store(api, redirect, MemoryCredentialStore::new())
}

fn form() -> LoginForm {
    LoginForm::new("a@b.com", "secret")
}

// =========================================================================
// submit: landing routes
// =========================================================================

#[tokio::test]
async fn admin_login_persists_mirror_and_lands_on_root() {
    let h = harness(ScriptedApi::for_role("ADMIN"), None);
    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;

    assert_eq!(outcome, LoginOutcome::Navigated("/".into()));
    assert_eq!(h.nav.last().as_deref(), Some("/"));
    let snap = h.store.snapshot();
    assert_eq!(snap.get(ACCESS_TOKEN_KEY).map(String::as_str), Some("tok"));
    assert_eq!(snap.get(USER_ROLE_KEY).map(String::as_str), Some("ADMIN"));
    assert_eq!(h.api.calls(), vec!["authenticate:a@b.com", "identity:tok"]);
    assert_eq!(h.flow.phase(), LoginPhase::Done);

    let created = h.sessions.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0.user_id.as_deref(), Some("1"));
    assert_eq!(created[0].0.role.as_deref(), Some("ADMIN"));
    assert_eq!(created[0].1, "tok");
}

#[tokio::test]
async fn employer_incomplete_profile_lands_on_registration() {
    let mut api = ScriptedApi::for_role("EMPLOYER");
    api.employer = Ok(ProfileStatus { profile_completed: false });
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::EMPLOYER_COMPLETE_REGISTRATION.into()));
}

#[tokio::test]
async fn employer_complete_profile_lands_on_profile() {
    let h = harness(ScriptedApi::for_role("EMPLOYER"), None);
    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::EMPLOYER_PROFILE.into()));
    assert!(h.api.calls().contains(&"employer_profile".to_owned()));
}

#[tokio::test]
async fn employer_profile_failure_lands_on_registration() {
    let mut api = ScriptedApi::for_role("EMPLOYER");
    api.employer = Err(ApiError::Status { status: 404, detail: None, code: None });
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::EMPLOYER_COMPLETE_REGISTRATION.into()));
    assert!(h.toasts.drain().iter().all(|t| t.level == ToastLevel::Success));
}

#[tokio::test]
async fn jobseeker_incomplete_profile_lands_on_cv_upload() {
    let mut api = ScriptedApi::for_role("JOBSEEKER");
    api.jobseeker = Ok(ProfileStatus { profile_completed: false });
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::JOBSEEKER_UPLOAD_CV.into()));
}

#[tokio::test]
async fn jobseeker_complete_profile_lands_on_profile() {
    let h = harness(ScriptedApi::for_role("JOBSEEKER"), None);
    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::JOBSEEKER_PROFILE.into()));
}

#[tokio::test]
async fn legacy_job_seeker_alias_takes_jobseeker_branch() {
    let mut api = ScriptedApi::for_role("JOB_SEEKER");
    api.jobseeker = Ok(ProfileStatus { profile_completed: false });
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::JOBSEEKER_UPLOAD_CV.into()));
}

#[tokio::test]
async fn jobseeker_profile_failure_lands_on_profile() {
    let mut api = ScriptedApi::for_role("JOBSEEKER");
    api.jobseeker = Err(ApiError::Request("connection reset".into()));
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated(paths::JOBSEEKER_PROFILE.into()));
}

#[tokio::test]
async fn unknown_role_lands_on_root() {
    let h = harness(ScriptedApi::for_role("RECRUITER"), None);
    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(outcome, LoginOutcome::Navigated("/".into()));
}

// =========================================================================
// submit: redirect parameter
// =========================================================================

#[tokio::test]
async fn redirect_param_wins_regardless_of_role_or_profile() {
    for role in ["ADMIN", "EMPLOYER", "JOBSEEKER"] {
        let mut api = ScriptedApi::for_role(role);
        api.employer = Ok(ProfileStatus { profile_completed: false });
        api.jobseeker = Ok(ProfileStatus { profile_completed: false });
        let h = harness(api, Some("/account/billing"));

        let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
        assert_eq!(outcome, LoginOutcome::Navigated("/account/billing".into()), "role {role}");
        assert_eq!(h.api.calls(), vec!["authenticate:a@b.com", "identity:tok"], "role {role}");
        assert_eq!(h.sessions.created.lock().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn root_and_null_redirects_are_ignored() {
    for redirect in ["/", "null", ""] {
        let h = harness(ScriptedApi::for_role("EMPLOYER"), Some(redirect));
        let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
        assert_eq!(outcome, LoginOutcome::Navigated(paths::EMPLOYER_PROFILE.into()), "redirect {redirect:?}");
    }
}

// =========================================================================
// submit: failures
// =========================================================================

#[tokio::test]
async fn invalid_form_never_reaches_the_api() {
    let h = harness(ScriptedApi::for_role("ADMIN"), None);
    let outcome = h.flow.submit(&LoginForm::new("not-an-email", "x"), &CancelToken::new()).await;

    assert_eq!(outcome, LoginOutcome::Invalid(FormError::InvalidEmail));
    assert!(h.api.calls().is_empty());
    assert_eq!(h.flow.phase(), LoginPhase::Idle);
}

#[tokio::test]
async fn rejected_credentials_toast_server_detail() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.grant = Err(rejected("Incorrect email or password"));
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert!(matches!(
        outcome,
        LoginOutcome::Failed { error: LoginError::Rejected(_), redirect: None }
    ));
    let toasts = h.toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert_eq!(toasts[0].message, "Incorrect email or password");
    assert!(h.nav.last().is_none());
    assert!(h.sessions.created.lock().unwrap().is_empty());
    assert_eq!(h.flow.phase(), LoginPhase::Failed);
}

#[tokio::test]
async fn unverified_email_redirects_to_verification_with_email() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.grant = Err(rejected("Please verify your email before logging in"));
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    let expected = paths::verify_email_for("a@b.com");
    assert!(matches!(&outcome, LoginOutcome::Failed { redirect: Some(r), .. } if *r == expected));
    assert_eq!(h.nav.last(), Some(expected));
    assert_eq!(h.toasts.drain().len(), 1);
}

#[tokio::test]
async fn missing_cv_redirects_to_signup() {
    let mut api = ScriptedApi::for_role("JOBSEEKER");
    api.grant = Err(rejected("Please upload your CV to continue"));
    let h = harness(api, None);

    h.flow.submit(&form(), &CancelToken::new()).await;
    assert_eq!(h.nav.last().as_deref(), Some(paths::SIGNUP));
}

#[tokio::test]
async fn success_without_token_is_terminal() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.grant = Ok(TokenGrant::default());
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert!(matches!(outcome, LoginOutcome::Failed { error: LoginError::MissingToken, redirect: None }));
    assert_eq!(h.api.calls(), vec!["authenticate:a@b.com"]);
    assert!(h.store.snapshot().is_empty());
}

#[tokio::test]
async fn identity_failure_after_exchange_persists_nothing() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.identity = Err(ApiError::Status { status: 500, detail: None, code: None });
    let h = harness(api, None);

    let outcome = h.flow.submit(&form(), &CancelToken::new()).await;
    assert!(matches!(outcome, LoginOutcome::Failed { error: LoginError::Identity(_), .. }));
    assert!(h.store.snapshot().is_empty());
    assert!(h.sessions.created.lock().unwrap().is_empty());
}

// =========================================================================
// check_existing
// =========================================================================

#[tokio::test]
async fn check_without_token_shows_form() {
    let h = harness(ScriptedApi::for_role("ADMIN"), None);
    assert_eq!(h.flow.check_existing(&CancelToken::new()).await, CheckOutcome::Ready);
    assert!(h.api.calls().is_empty());
    assert_eq!(h.flow.phase(), LoginPhase::Ready);
}

#[tokio::test]
async fn check_with_redirect_param_skips_probe() {
    let h = harness_with_store(
        ScriptedApi::for_role("ADMIN"),
        Some("/employer/jobs"),
        MemoryCredentialStore::with_token("tok"),
    );
    assert_eq!(h.flow.check_existing(&CancelToken::new()).await, CheckOutcome::Ready);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn check_with_valid_token_redirects_by_role() {
    let mut api = ScriptedApi::for_role("EMPLOYER");
    api.employer = Ok(ProfileStatus { profile_completed: false });
    let h = harness_with_store(api, None, MemoryCredentialStore::with_token("tok"));

    let outcome = h.flow.check_existing(&CancelToken::new()).await;
    assert_eq!(outcome, CheckOutcome::Redirected(paths::EMPLOYER_COMPLETE_REGISTRATION.into()));
    assert_eq!(h.nav.last().as_deref(), Some(paths::EMPLOYER_COMPLETE_REGISTRATION));
    assert_eq!(h.flow.phase(), LoginPhase::Done);
}

#[tokio::test]
async fn check_with_invalid_token_clears_storage() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.identity = Err(rejected("Could not validate credentials"));
    let store = MemoryCredentialStore::with_token("old");
    store.set("user_id", "1");
    let h = harness_with_store(api, None, store);

    assert_eq!(h.flow.check_existing(&CancelToken::new()).await, CheckOutcome::Ready);
    assert!(h.store.snapshot().is_empty());
    assert!(h.nav.last().is_none());
    assert!(h.toasts.drain().is_empty());
}

#[tokio::test]
async fn check_runs_at_most_once_per_flow() {
    let h = harness_with_store(ScriptedApi::for_role("ADMIN"), None, MemoryCredentialStore::with_token("tok"));
    let cancel = CancelToken::new();

    assert_eq!(h.flow.check_existing(&cancel).await, CheckOutcome::Redirected("/".into()));
    assert_eq!(h.flow.check_existing(&cancel).await, CheckOutcome::AlreadyChecked);
    assert_eq!(h.api.calls(), vec!["identity:tok"]);
}

// =========================================================================
// cancellation
// =========================================================================

#[tokio::test]
async fn cancelled_before_submit_makes_no_calls() {
    let h = harness(ScriptedApi::for_role("ADMIN"), None);
    let cancel = CancelToken::new();
    cancel.cancel();

    assert_eq!(h.flow.submit(&form(), &cancel).await, LoginOutcome::Cancelled);
    assert!(h.api.calls().is_empty());
    assert!(h.nav.last().is_none());
    assert_eq!(h.flow.phase(), LoginPhase::Ready);
}

#[tokio::test]
async fn cancel_mid_flight_abandons_without_side_effects() {
    let mut api = ScriptedApi::for_role("ADMIN");
    api.stall_identity = true;
    let h = harness(api, None);
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        remote.cancel();
    });

    let outcome = timeout(Duration::from_secs(2), h.flow.submit(&form(), &cancel))
        .await
        .expect("flow should observe cancellation");
    assert_eq!(outcome, LoginOutcome::Cancelled);
    assert!(h.store.snapshot().is_empty());
    assert!(h.sessions.created.lock().unwrap().is_empty());
    assert!(h.nav.last().is_none());
    assert!(h.toasts.drain().is_empty());
    assert_eq!(h.flow.phase(), LoginPhase::Ready);
}

#[tokio::test]
async fn cancelled_check_returns_to_ready() {
    let mut api = ScriptedApi::for_role("EMPLOYER");
    api.stall_identity = true;
    let h = harness_with_store(api, None, MemoryCredentialStore::with_token("tok"));
    let cancel = CancelToken::new();
    cancel.cancel();

    assert_eq!(h.flow.check_existing(&cancel).await, CheckOutcome::Cancelled);
    assert_eq!(h.flow.phase(), LoginPhase::Ready);
    assert!(h.nav.last().is_none());
    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).as_deref(), Some("tok"));
}

// =========================================================================
// logout
// =========================================================================

#[test]
fn logout_twice_leaves_everything_empty() {
    let store = MemoryCredentialStore::with_token("tok");
    store.set("user_role", "ADMIN");
    let sessions = RecordingSessions::default();

    logout(&store, &sessions);
    assert!(store.snapshot().is_empty());
    logout(&store, &sessions);
    assert!(store.snapshot().is_empty());
    assert_eq!(*sessions.destroyed.lock().unwrap(), 2);
}

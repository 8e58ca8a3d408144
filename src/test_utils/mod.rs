//! Test utilities: a programmable in-memory marketplace API, claim
//! fixtures, and an app-state builder for HTTP-level tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderValue;
use chrono::Utc;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::{app_state::AppState, cookies},
    app_error::{AppError, AppResult},
    application::{
        jwt::SessionCodec,
        ports::market::{
            AuthorityReceipt, ImpersonationGrant, IssuedToken, LoginCredentials, LoginGrant,
            MarketApi, ProfileSnapshot, SubscriptionSnapshot,
        },
        use_cases::{
            impersonation::ImpersonationUseCases, payment::PaymentUseCases,
            session::SessionUseCases,
        },
    },
    domain::entities::{role::Role, session::SessionClaims, subscription::SubscriptionStatus},
    infra::config::AppConfig,
};

// ============================================================================
// MockMarketApi
// ============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct CallCounts {
    pub login: usize,
    pub refresh: usize,
    pub profile: usize,
    pub impersonate: usize,
    pub subscribe: usize,
    pub subscription: usize,
}

/// Programmable stand-in for the marketplace backend.
///
/// `None` in a result slot makes that operation fail with
/// `BackendUnavailable`; `authority_statuses` is consumed front-to-back,
/// defaulting to 200 when empty.
pub struct MockMarketApi {
    pub refresh_result: Mutex<Option<IssuedToken>>,
    pub profile_result: Mutex<Option<ProfileSnapshot>>,
    pub impersonation_available: Mutex<bool>,
    pub authority_statuses: Mutex<Vec<u16>>,
    pub subscription_result: Mutex<Option<SubscriptionSnapshot>>,
    pub calls: Mutex<CallCounts>,
}

impl Default for MockMarketApi {
    fn default() -> Self {
        Self {
            refresh_result: Mutex::new(None),
            profile_result: Mutex::new(None),
            impersonation_available: Mutex::new(true),
            authority_statuses: Mutex::new(Vec::new()),
            subscription_result: Mutex::new(None),
            calls: Mutex::new(CallCounts::default()),
        }
    }
}

#[async_trait]
impl MarketApi for MockMarketApi {
    async fn login(&self, _credentials: &LoginCredentials) -> AppResult<LoginGrant> {
        self.calls.lock().unwrap().login += 1;
        Ok(LoginGrant {
            subject_id: "u-1".into(),
            token: IssuedToken {
                access_token: "at-login".into(),
                expires_in_secs: 3_600,
            },
            refresh_token: "rt-login".into(),
            profile: test_profile(
                Role::Retailer,
                SubscriptionStatus::Active,
                Some(Utc::now().timestamp_millis() + 30 * 86_400_000),
            ),
        })
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> AppResult<IssuedToken> {
        self.calls.lock().unwrap().refresh += 1;
        self.refresh_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::BackendUnavailable("refresh rejected".into()))
    }

    async fn fetch_profile(&self, _access_token: &str) -> AppResult<ProfileSnapshot> {
        self.calls.lock().unwrap().profile += 1;
        self.profile_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::BackendUnavailable("profile unavailable".into()))
    }

    async fn impersonate(
        &self,
        _access_token: &str,
        target_user_id: &str,
    ) -> AppResult<ImpersonationGrant> {
        self.calls.lock().unwrap().impersonate += 1;
        if !*self.impersonation_available.lock().unwrap() {
            return Err(AppError::TargetMissing);
        }
        Ok(ImpersonationGrant {
            subject_id: target_user_id.to_owned(),
            access_token: format!("imp-at-{}", target_user_id),
            profile: test_profile(
                Role::Retailer,
                SubscriptionStatus::Active,
                Some(Utc::now().timestamp_millis() + 30 * 86_400_000),
            ),
        })
    }

    async fn subscribe_from_authority(
        &self,
        _access_token: &str,
        _authority: &str,
    ) -> AppResult<AuthorityReceipt> {
        self.calls.lock().unwrap().subscribe += 1;
        let mut statuses = self.authority_statuses.lock().unwrap();
        let http_status = if statuses.is_empty() {
            200
        } else {
            statuses.remove(0)
        };
        let subscription_id = (200..300)
            .contains(&http_status)
            .then(|| "sub-1".to_owned());
        Ok(AuthorityReceipt {
            http_status,
            subscription_id,
        })
    }

    async fn current_subscription(&self, _access_token: &str) -> AppResult<SubscriptionSnapshot> {
        self.calls.lock().unwrap().subscription += 1;
        self.subscription_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::BackendUnavailable("subscription lookup failed".into()))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn test_profile(
    role: Role,
    subscription_status: SubscriptionStatus,
    subscription_expires_at: Option<i64>,
) -> ProfileSnapshot {
    ProfileSnapshot {
        role,
        subscription_status,
        subscription_expires_at,
    }
}

/// A retailer with a live access token and an active subscription.
pub fn retailer_claims() -> SessionClaims {
    let now = Utc::now().timestamp_millis();
    SessionClaims {
        sub: "u-201".into(),
        role: Role::Retailer,
        access_token: "at-1".into(),
        refresh_token: "rt-1".into(),
        access_token_expires_at: now + 3_600_000,
        subscription_status: SubscriptionStatus::Active,
        subscription_expires_at: Some(now + 30 * 86_400_000),
        impersonating: false,
        original_admin: None,
        error: None,
    }
}

/// An administrator with a live access token.
pub fn admin_claims() -> SessionClaims {
    let now = Utc::now().timestamp_millis();
    SessionClaims {
        sub: "admin-1".into(),
        role: Role::Admin,
        access_token: "admin-at".into(),
        refresh_token: "admin-rt".into(),
        access_token_expires_at: now + 3_600_000,
        subscription_status: SubscriptionStatus::None,
        subscription_expires_at: None,
        impersonating: false,
        original_admin: None,
        error: None,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        session_secret: SecretString::from("test-secret".to_string()),
        session_ttl: Duration::days(30),
        impersonation_ttl: Duration::hours(1),
        is_production: false,
        market_api_base: "http://market.test/api/".parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
    }
}

pub fn test_app_state(api: Arc<MockMarketApi>) -> AppState {
    let config = Arc::new(test_config());
    let codec = Arc::new(SessionCodec::new(
        config.session_secret.clone(),
        config.session_ttl,
    ));
    let api: Arc<dyn MarketApi> = api;

    AppState {
        config: config.clone(),
        codec,
        session_use_cases: Arc::new(SessionUseCases::new(api.clone())),
        impersonation_use_cases: Arc::new(ImpersonationUseCases::new(
            api.clone(),
            config.impersonation_ttl,
        )),
        payment_use_cases: Arc::new(PaymentUseCases::new(api)),
    }
}

/// Encodes `claims` with the test app state's codec and returns the cookie
/// header pair to attach to a request.
pub fn session_cookie_header(app_state: &AppState, claims: &SessionClaims) -> (&'static str, String) {
    let token = app_state.codec.encode(claims).unwrap();
    (cookies::cookie_name(app_state.config.is_production), token)
}

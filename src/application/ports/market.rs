//! Port for the marketplace backend API.
//!
//! The backend is the sole source of truth for credentials and subscription
//! state; the broker only talks to it through this trait. Implementations
//! map transport and HTTP-level failures to `AppError`, with one deliberate
//! exception: `subscribe_from_authority` preserves the raw HTTP status so
//! the payment guard can classify it.

use async_trait::async_trait;

use crate::app_error::AppResult;
use crate::domain::entities::role::Role;
use crate::domain::entities::subscription::SubscriptionStatus;

/// Credentials presented at login.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub phone: String,
    pub password: String,
}

/// A minted access token with its relative expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Seconds from now. Callers convert to an absolute instant the moment
    /// the response arrives; only absolute instants go into claims.
    pub expires_in_secs: i64,
}

/// Account fields the broker mirrors into session claims.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub role: Role,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<i64>,
}

/// Everything a fresh login yields.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub subject_id: String,
    pub token: IssuedToken,
    pub refresh_token: String,
    pub profile: ProfileSnapshot,
}

/// An impersonation-scoped token plus the target account's profile.
#[derive(Debug, Clone)]
pub struct ImpersonationGrant {
    pub subject_id: String,
    pub access_token: String,
    pub profile: ProfileSnapshot,
}

/// Raw outcome of the subscription-from-authority endpoint. The HTTP status
/// is preserved for the guard to classify; 2xx bodies may be empty.
#[derive(Debug, Clone)]
pub struct AuthorityReceipt {
    pub http_status: u16,
    pub subscription_id: Option<String>,
}

/// Current subscription state, used by the guard's one-shot fallback check.
#[derive(Debug, Clone)]
pub struct SubscriptionSnapshot {
    pub status: SubscriptionStatus,
    pub expires_at: Option<i64>,
}

#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn login(&self, credentials: &LoginCredentials) -> AppResult<LoginGrant>;

    /// Exchanges a refresh token for a new access token. A rotated or
    /// rejected refresh token surfaces as `BackendUnavailable`.
    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<IssuedToken>;

    async fn fetch_profile(&self, access_token: &str) -> AppResult<ProfileSnapshot>;

    async fn impersonate(
        &self,
        access_token: &str,
        target_user_id: &str,
    ) -> AppResult<ImpersonationGrant>;

    async fn subscribe_from_authority(
        &self,
        access_token: &str,
        authority: &str,
    ) -> AppResult<AuthorityReceipt>;

    async fn current_subscription(&self, access_token: &str) -> AppResult<SubscriptionSnapshot>;
}

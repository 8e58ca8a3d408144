//! Session lifecycle: minting claims at login and rotating access tokens.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::market::{LoginCredentials, MarketApi};
use crate::domain::entities::session::SessionClaims;

pub struct SessionUseCases {
    api: Arc<dyn MarketApi>,
}

impl SessionUseCases {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self { api }
    }

    /// Mints claims from scratch for freshly presented credentials.
    pub async fn login(&self, credentials: &LoginCredentials) -> AppResult<SessionClaims> {
        let grant = self.api.login(credentials).await?;
        let now = Utc::now().timestamp_millis();

        Ok(SessionClaims {
            sub: grant.subject_id,
            role: grant.profile.role,
            access_token: grant.token.access_token,
            refresh_token: grant.refresh_token,
            access_token_expires_at: now + grant.token.expires_in_secs * 1_000,
            subscription_status: grant.profile.subscription_status,
            subscription_expires_at: grant.profile.subscription_expires_at,
            impersonating: false,
            original_admin: None,
            error: None,
        })
    }

    /// Rotates the access token using the session's refresh token.
    ///
    /// Never retries internally; the caller owns any retry. Returns new
    /// claims only. Encoding and cookie issuance stay with the caller, so
    /// a failure here leaves the previous cookie untouched.
    pub async fn refresh(&self, current: &SessionClaims) -> AppResult<SessionClaims> {
        if current.refresh_token.is_empty() {
            return Err(AppError::NoRefreshToken);
        }

        let token = self
            .api
            .refresh_access_token(&current.refresh_token)
            .await
            .map_err(|e| AppError::RefreshFailed(e.to_string()))?;

        // Fix the absolute instant now, before the profile fetch can add
        // latency between response arrival and claim construction.
        let expires_at = Utc::now().timestamp_millis() + token.expires_in_secs * 1_000;

        // Best-effort: stale role/subscription data is less harmful than
        // blocking token rotation.
        let profile = match self.api.fetch_profile(&token.access_token).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "profile fetch failed during refresh, keeping previous claims");
                None
            }
        };

        let mut next = current.clone();
        next.access_token = token.access_token;
        next.access_token_expires_at = expires_at;
        if let Some(profile) = profile {
            next.role = profile.role;
            next.subscription_status = profile.subscription_status;
            next.subscription_expires_at = profile.subscription_expires_at;
        }
        next.error = None;
        Ok(next)
    }
}

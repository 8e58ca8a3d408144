//! Reconciles payment-gateway callbacks against backend subscription state.
//!
//! The gateway may deliver the same callback more than once (back button,
//! gateway retry); the backend's 409/208 answer for a replayed authority is
//! what makes re-processing safe. No authority is remembered locally.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::market::MarketApi;
use crate::domain::entities::subscription::SubscriptionStatus;

/// Sentinel the gateway uses for a successful payment, compared
/// case-insensitively.
pub const GATEWAY_OK: &str = "OK";

/// Successful reconciliation outcomes. `AlreadyVerified` means a prior,
/// possibly-concurrent callback applied this authority first; callers treat
/// both as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified(Option<String>),
    AlreadyVerified,
}

pub struct PaymentUseCases {
    api: Arc<dyn MarketApi>,
}

impl PaymentUseCases {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self { api }
    }

    /// Verifies one gateway callback. `status` and `authority` come straight
    /// from the gateway's query string.
    pub async fn verify_callback(
        &self,
        access_token: &str,
        status: &str,
        authority: &str,
    ) -> AppResult<Verification> {
        // The gateway said no, or gave us nothing to verify. The backend is
        // never called for these.
        if !status.eq_ignore_ascii_case(GATEWAY_OK) || authority.is_empty() {
            return Err(AppError::GatewayRejected);
        }

        let receipt = self
            .api
            .subscribe_from_authority(access_token, authority)
            .await?;

        match receipt.http_status {
            200..=299 => Ok(Verification::Verified(receipt.subscription_id)),
            // The backend already applied this authority; duplicate gateway
            // deliveries and racing tabs land here.
            409 | 208 => Ok(Verification::AlreadyVerified),
            // Permanent rejection. Retrying or re-checking cannot change it.
            400 | 422 => Err(AppError::InvalidAuthority),
            other => self.recheck_subscription(access_token, other).await,
        }
    }

    /// One-shot fallback for inconclusive responses: the charge may have
    /// landed even though the answer did not. Exactly one re-check, no
    /// further retries.
    async fn recheck_subscription(
        &self,
        access_token: &str,
        http_status: u16,
    ) -> AppResult<Verification> {
        warn!(
            http_status,
            "authority verification inconclusive, re-checking subscription state"
        );

        let snapshot = self
            .api
            .current_subscription(access_token)
            .await
            .map_err(|_| AppError::TransientFailure)?;

        let now = Utc::now().timestamp_millis();
        let settled = matches!(
            snapshot.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trial
        ) && snapshot.expires_at.is_some_and(|at| at > now);

        if settled {
            Ok(Verification::Verified(None))
        } else {
            Err(AppError::TransientFailure)
        }
    }
}

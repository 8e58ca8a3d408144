use serde::{Deserialize, Serialize};

use super::role::Role;
use super::subscription::SubscriptionStatus;

/// Payload of the session cookie token.
///
/// The cookie is the only place session state lives; everything a request
/// needs (identity, backend credentials, subscription snapshot, and any
/// suspended admin identity) travels in here. Wire field names are
/// camelCase to match the storefront client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute instant, epoch milliseconds. Never a relative duration:
    /// re-issuing the cookie must not shift it.
    pub access_token_expires_at: i64,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<i64>,
    pub impersonating: bool,
    /// Present iff `impersonating`. `AdminSession` cannot itself nest, so
    /// depth is capped at one level by construction.
    pub original_admin: Option<AdminSession>,
    /// Refresh-failure tag surfaced to the storefront without immediately
    /// invalidating the cookie.
    pub error: Option<String>,
}

/// The administrator identity preserved across an impersonation.
///
/// Deliberately not a `SessionClaims`: it has no `impersonating`,
/// `original_admin`, or `error` field, so a nested session can never carry
/// further nesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub sub: String,
    pub role: Role,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: i64,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<i64>,
}

impl SessionClaims {
    /// Whether the inner access token has lapsed (or lapses within
    /// `skew_ms`), requiring a refresh before the backend will accept it.
    pub fn access_token_expired(&self, now_ms: i64, skew_ms: i64) -> bool {
        self.access_token_expires_at <= now_ms + skew_ms
    }
}

impl From<&SessionClaims> for AdminSession {
    /// Captures the identity fields, dropping any impersonation state the
    /// claims may already carry.
    fn from(claims: &SessionClaims) -> Self {
        Self {
            sub: claims.sub.clone(),
            role: claims.role,
            access_token: claims.access_token.clone(),
            refresh_token: claims.refresh_token.clone(),
            access_token_expires_at: claims.access_token_expires_at,
            subscription_status: claims.subscription_status,
            subscription_expires_at: claims.subscription_expires_at,
        }
    }
}

impl From<AdminSession> for SessionClaims {
    /// Restores a full session from a preserved admin identity.
    fn from(admin: AdminSession) -> Self {
        Self {
            sub: admin.sub,
            role: admin.role,
            access_token: admin.access_token,
            refresh_token: admin.refresh_token,
            access_token_expires_at: admin.access_token_expires_at,
            subscription_status: admin.subscription_status,
            subscription_expires_at: admin.subscription_expires_at,
            impersonating: false,
            original_admin: None,
            error: None,
        }
    }
}

//! HTTP client for the marketplace backend API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::market::{
    AuthorityReceipt, ImpersonationGrant, IssuedToken, LoginCredentials, LoginGrant, MarketApi,
    ProfileSnapshot, SubscriptionSnapshot,
};
use crate::domain::entities::role::Role;
use crate::domain::entities::subscription::SubscriptionStatus;
use crate::infra::http_client;

pub struct MarketClient {
    client: Client,
    base: Url,
}

impl MarketClient {
    pub fn new(base: Url) -> Self {
        Self {
            client: http_client::build_client(),
            base,
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint path {}: {}", path, e)))
    }
}

fn transport(e: reqwest::Error) -> AppError {
    AppError::BackendUnavailable(e.to_string())
}

// ============================================================================
// Wire types (backend responses are camelCase)
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    user_id: String,
    access_token: String,
    refresh_token: String,
    /// Relative seconds until the access token lapses.
    expires_in: i64,
    role: Role,
    subscription_status: SubscriptionStatus,
    subscription_expires_at: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    /// Relative seconds, despite the name; converted to an absolute instant
    /// by the caller the moment it arrives.
    access_token_expires_at: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    role: Role,
    subscription_status: SubscriptionStatus,
    subscription_expires_at: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImpersonateResponse {
    impersonation_token: String,
    user: ImpersonatedUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImpersonatedUser {
    id: String,
    role: Role,
    subscription_status: SubscriptionStatus,
    subscription_expires_at: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeResponse {
    subscription_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    subscription_status: SubscriptionStatus,
    subscription_expires_at: Option<i64>,
}

#[async_trait]
impl MarketApi for MarketClient {
    async fn login(&self, credentials: &LoginCredentials) -> AppResult<LoginGrant> {
        let response = self
            .client
            .post(self.endpoint("auth/login")?)
            .json(&serde_json::json!({
                "phone": credentials.phone,
                "password": credentials.password,
            }))
            .send()
            .await
            .map_err(transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthenticated);
        }
        if !response.status().is_success() {
            return Err(AppError::BackendUnavailable(format!(
                "login returned {}",
                response.status()
            )));
        }

        let body: LoginResponse = response.json().await.map_err(transport)?;
        Ok(LoginGrant {
            subject_id: body.user_id,
            token: IssuedToken {
                access_token: body.access_token,
                expires_in_secs: body.expires_in,
            },
            refresh_token: body.refresh_token,
            profile: ProfileSnapshot {
                role: body.role,
                subscription_status: body.subscription_status,
                subscription_expires_at: body.subscription_expires_at,
            },
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let response = self
            .client
            .post(self.endpoint("auth/refresh")?)
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(transport)?;

        // A rotated-away refresh token comes back as a 4xx here; either way
        // this call failed and the caller treats the session as dead.
        if !response.status().is_success() {
            return Err(AppError::BackendUnavailable(format!(
                "refresh returned {}",
                response.status()
            )));
        }

        let body: RefreshResponse = response.json().await.map_err(transport)?;
        Ok(IssuedToken {
            access_token: body.access_token,
            expires_in_secs: body.access_token_expires_at,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> AppResult<ProfileSnapshot> {
        let response = self
            .client
            .get(self.endpoint("auth/profile")?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(AppError::BackendUnavailable(format!(
                "profile returned {}",
                response.status()
            )));
        }

        let body: ProfileResponse = response.json().await.map_err(transport)?;
        Ok(ProfileSnapshot {
            role: body.role,
            subscription_status: body.subscription_status,
            subscription_expires_at: body.subscription_expires_at,
        })
    }

    async fn impersonate(
        &self,
        access_token: &str,
        target_user_id: &str,
    ) -> AppResult<ImpersonationGrant> {
        let response = self
            .client
            .post(self.endpoint("admin/impersonate")?)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "userId": target_user_id }))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::TargetMissing);
        }
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Forbidden);
        }
        if !status.is_success() {
            return Err(AppError::BackendUnavailable(format!(
                "impersonate returned {}",
                status
            )));
        }

        let body: ImpersonateResponse = response.json().await.map_err(transport)?;
        Ok(ImpersonationGrant {
            subject_id: body.user.id,
            access_token: body.impersonation_token,
            profile: ProfileSnapshot {
                role: body.user.role,
                subscription_status: body.user.subscription_status,
                subscription_expires_at: body.user.subscription_expires_at,
            },
        })
    }

    async fn subscribe_from_authority(
        &self,
        access_token: &str,
        authority: &str,
    ) -> AppResult<AuthorityReceipt> {
        let response = self
            .client
            .post(self.endpoint("subscriptions/from-authority")?)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "authority": authority }))
            .send()
            .await
            .map_err(transport)?;

        let http_status = response.status().as_u16();

        // Classification is the guard's job; only a successful body is worth
        // parsing, and even that may legitimately be empty.
        let subscription_id = if response.status().is_success() {
            response
                .json::<SubscribeResponse>()
                .await
                .ok()
                .and_then(|b| b.subscription_id)
        } else {
            None
        };

        Ok(AuthorityReceipt {
            http_status,
            subscription_id,
        })
    }

    async fn current_subscription(&self, access_token: &str) -> AppResult<SubscriptionSnapshot> {
        let response = self
            .client
            .get(self.endpoint("subscriptions/current")?)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(AppError::BackendUnavailable(format!(
                "subscription lookup returned {}",
                response.status()
            )));
        }

        let body: SubscriptionResponse = response.json().await.map_err(transport)?;
        Ok(SubscriptionSnapshot {
            status: body.subscription_status,
            expires_at: body.subscription_expires_at,
        })
    }
}

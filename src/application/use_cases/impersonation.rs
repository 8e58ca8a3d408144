//! Administrator impersonation: assuming another account's identity while
//! keeping a path back to the original one inside the session itself.

use std::sync::Arc;

use chrono::Utc;
use time::Duration;

use crate::app_error::{AppError, AppResult};
use crate::application::ports::market::MarketApi;
use crate::domain::entities::session::{AdminSession, SessionClaims};

pub struct ImpersonationUseCases {
    api: Arc<dyn MarketApi>,
    /// Lifetime of the impersonation-scoped access token.
    ttl: Duration,
}

impl ImpersonationUseCases {
    pub fn new(api: Arc<dyn MarketApi>, ttl: Duration) -> Self {
        Self { api, ttl }
    }

    /// Mints a session carrying the target user's identity, with the
    /// caller's own identity preserved inside it. Returns the new claims
    /// and the landing route for the assumed role.
    pub async fn start(
        &self,
        current: &SessionClaims,
        target_user_id: &str,
    ) -> AppResult<(SessionClaims, &'static str)> {
        if !current.role.is_admin() {
            return Err(AppError::Forbidden);
        }

        let grant = self
            .api
            .impersonate(&current.access_token, target_user_id)
            .await?;

        // Capturing through AdminSession drops any nesting the current
        // claims may carry, so even a start issued from an impersonated
        // token stays one level deep.
        let original = AdminSession::from(current);
        let now = Utc::now().timestamp_millis();

        let claims = SessionClaims {
            sub: grant.subject_id,
            role: grant.profile.role,
            access_token: grant.access_token,
            // An impersonated session cannot rotate itself. When the scoped
            // token lapses, refresh fails and the admin is dropped back to
            // a plain login instead of silently re-minting the target.
            refresh_token: String::new(),
            access_token_expires_at: now + self.ttl.whole_milliseconds() as i64,
            subscription_status: grant.profile.subscription_status,
            subscription_expires_at: grant.profile.subscription_expires_at,
            impersonating: true,
            original_admin: Some(original),
            error: None,
        };

        let landing = claims.role.landing_route();
        Ok((claims, landing))
    }

    /// Restores the preserved admin identity. Purely local: the nested
    /// session is re-issued as-is, no backend call involved.
    pub fn stop(&self, current: &SessionClaims) -> AppResult<(SessionClaims, &'static str)> {
        if !current.impersonating {
            return Err(AppError::NotImpersonating);
        }
        let Some(original) = current.original_admin.clone() else {
            return Err(AppError::NotImpersonating);
        };

        let restored = SessionClaims::from(original);
        let landing = restored.role.landing_route();
        Ok((restored, landing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::role::Role;
    use crate::test_utils::{MockMarketApi, admin_claims, retailer_claims};

    fn use_cases(api: &Arc<MockMarketApi>) -> ImpersonationUseCases {
        ImpersonationUseCases::new(api.clone() as Arc<dyn MarketApi>, Duration::hours(1))
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_without_backend_call() {
        let api = Arc::new(MockMarketApi::default());

        let err = use_cases(&api)
            .start(&retailer_claims(), "u-201")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
        assert_eq!(api.calls.lock().unwrap().impersonate, 0);
    }

    #[tokio::test]
    async fn start_nests_the_admin_identity() {
        let api = Arc::new(MockMarketApi::default());
        let admin = admin_claims();

        let (claims, landing) = use_cases(&api).start(&admin, "u-201").await.unwrap();

        assert!(claims.impersonating);
        assert_eq!(claims.sub, "u-201");
        assert_eq!(claims.role, Role::Retailer);
        assert_eq!(landing, "/shop");
        assert!(claims.refresh_token.is_empty());

        let nested = claims.original_admin.expect("admin identity preserved");
        assert_eq!(nested.sub, admin.sub);
        assert_eq!(nested.role, admin.role);
        assert_eq!(nested.refresh_token, admin.refresh_token);
    }

    #[tokio::test]
    async fn start_from_impersonated_claims_stays_one_level_deep() {
        let api = Arc::new(MockMarketApi::default());
        let admin = admin_claims();

        let (first, _) = use_cases(&api).start(&admin, "u-201").await.unwrap();
        // Force the impersonated identity to an admin role so the second
        // start passes the role gate.
        let mut first = first;
        first.role = Role::Admin;

        let (second, _) = use_cases(&api).start(&first, "u-202").await.unwrap();

        // The preserved identity is `first`'s, with its own nesting dropped;
        // AdminSession cannot carry a deeper level.
        let nested = second.original_admin.expect("identity preserved");
        assert_eq!(nested.sub, first.sub);
        assert_eq!(nested.role, Role::Admin);
    }

    #[tokio::test]
    async fn stop_restores_the_original_admin_claims() {
        let api = Arc::new(MockMarketApi::default());
        let admin = admin_claims();

        let (impersonated, _) = use_cases(&api).start(&admin, "u-201").await.unwrap();
        let (restored, landing) = use_cases(&api).stop(&impersonated).unwrap();

        assert_eq!(restored, admin);
        assert_eq!(landing, "/admin");
    }

    #[tokio::test]
    async fn stop_without_impersonation_fails() {
        let api = Arc::new(MockMarketApi::default());

        let err = use_cases(&api).stop(&admin_claims()).unwrap_err();

        assert!(matches!(err, AppError::NotImpersonating));
    }

    #[tokio::test]
    async fn unknown_target_propagates() {
        let api = Arc::new(MockMarketApi::default());
        *api.impersonation_available.lock().unwrap() = false;

        let err = use_cases(&api)
            .start(&admin_claims(), "u-999")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TargetMissing));
    }
}

//! Session resolution and role gating.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::{
    adapters::http::{app_state::AppState, cookies},
    app_error::{AppError, ErrorCode},
    domain::entities::{role::Role, session::SessionClaims},
};

/// How far ahead of the access token's expiry a silent refresh starts.
const REFRESH_SKEW_MS: i64 = 30_000;

/// Pause before the single refresh retry, giving a just-rotated token time
/// to become visible across the backend.
const RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(250);

/// Resolves the session cookie into a `SessionClaims` request extension.
///
/// A stale access token is refreshed in-line and the cookie re-issued on
/// the response. A request without a usable session proceeds without the
/// extension; the route gate turns that into 401 where it matters. Mid-flow
/// failure never rewrites the cookie, so the previous session survives.
pub async fn resolve_session(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = cookies::read_session(&jar) else {
        return Ok(next.run(request).await);
    };

    let claims = match app_state.codec.decode(&token) {
        Ok(claims) => claims,
        Err(e) => {
            // Tampered or outer-expired token: logged-out state.
            tracing::debug!(error = %e, "session token rejected");
            return Ok(next.run(request).await);
        }
    };

    let now = Utc::now().timestamp_millis();
    if !claims.access_token_expired(now, REFRESH_SKEW_MS) {
        request.extensions_mut().insert(claims);
        return Ok(next.run(request).await);
    }

    // Silent refresh, with exactly one retry on a backend rejection. Two
    // tabs may race through here with the same refresh token; whichever
    // response lands last owns the cookie.
    let refreshed = match app_state.session_use_cases.refresh(&claims).await {
        Err(AppError::RefreshFailed(first)) => {
            tracing::debug!(error = %first, "refresh rejected, retrying once");
            tokio::time::sleep(RETRY_DELAY).await;
            app_state.session_use_cases.refresh(&claims).await
        }
        other => other,
    };

    match refreshed {
        Ok(fresh) => {
            request.extensions_mut().insert(fresh.clone());
            let response = next.run(request).await;
            Ok(reissue(&app_state, &fresh, response))
        }
        Err(AppError::NoRefreshToken) => {
            // Nothing to rotate with (impersonated sessions end up here once
            // their scoped token lapses). Proceed unauthenticated; the old
            // cookie is left alone until sign-out or outer expiry.
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, "silent refresh failed");
            let mut stale = claims;
            stale.error = Some(ErrorCode::RefreshFailed.as_str().to_owned());
            request.extensions_mut().insert(stale.clone());
            let response = next.run(request).await;
            // Surface the failure tag in the cookie without signing the
            // user out; the storefront decides when to force re-login.
            Ok(reissue(&app_state, &stale, response))
        }
    }
}

fn reissue(app_state: &AppState, claims: &SessionClaims, mut response: Response) -> Response {
    match app_state.codec.encode(claims) {
        Ok(token) => {
            let result = cookies::write_session(
                response.headers_mut(),
                token,
                app_state.config.is_production,
                app_state.config.session_ttl,
            );
            if let Err(e) = result {
                tracing::error!(error = %e, "failed to append re-issued session cookie");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to re-encode session"),
    }
    response
}

/// Access requirements for a gated route subtree.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub roles: &'static [Role],
    pub require_subscription: bool,
}

impl RouteRule {
    pub const fn roles(roles: &'static [Role]) -> Self {
        Self {
            roles,
            require_subscription: false,
        }
    }

    pub const fn subscribed(roles: &'static [Role]) -> Self {
        Self {
            roles,
            require_subscription: true,
        }
    }
}

/// Pure gate predicate, shared by the middleware and any page logic.
pub fn permits(claims: &SessionClaims, rule: &RouteRule, now_ms: i64) -> bool {
    rule.roles.contains(&claims.role)
        && (!rule.require_subscription
            || claims
                .subscription_status
                .entitles(claims.subscription_expires_at, now_ms))
}

/// Gate middleware: 401 without a resolved session, 403 when the rule
/// rejects the resolved one.
pub async fn require(rule: RouteRule, request: Request, next: Next) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<SessionClaims>()
        .ok_or(AppError::Unauthenticated)?;

    if !permits(claims, &rule, Utc::now().timestamp_millis()) {
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

//! Session lifecycle routes: login, introspection, refresh, logout.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::adapters::http::app_state::AppState;
use crate::adapters::http::cookies;
use crate::app_error::{AppError, AppResult};
use crate::application::ports::market::LoginCredentials;
use crate::domain::entities::role::Role;
use crate::domain::entities::session::SessionClaims;
use crate::domain::entities::subscription::SubscriptionStatus;

#[derive(Deserialize)]
struct LoginRequest {
    phone: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct SessionResponse {
    ok: bool,
    authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscription_expires_at: Option<i64>,
    impersonating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// POST /api/session/login
/// Mints a session from scratch and issues the cookie.
async fn login(
    State(app_state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let phone = body.phone.unwrap_or_default();
    let password = body.password.unwrap_or_default();
    if phone.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "phone and password are required".into(),
        ));
    }

    let credentials = LoginCredentials { phone, password };
    let claims = app_state.session_use_cases.login(&credentials).await?;

    let mut headers = HeaderMap::new();
    issue_cookie(&app_state, &claims, &mut headers)?;

    Ok((
        headers,
        Json(serde_json::json!({ "ok": true, "landing": claims.role.landing_route() })),
    ))
}

/// GET /api/session
/// Introspection for the storefront: who the cookie currently resolves to.
async fn check_session(claims: Option<axum::Extension<SessionClaims>>) -> Json<SessionResponse> {
    match claims {
        Some(axum::Extension(claims)) => Json(SessionResponse {
            ok: true,
            authenticated: true,
            sub: Some(claims.sub),
            role: Some(claims.role),
            subscription_status: Some(claims.subscription_status),
            subscription_expires_at: claims.subscription_expires_at,
            impersonating: claims.impersonating,
            error: claims.error,
        }),
        None => Json(SessionResponse {
            ok: true,
            authenticated: false,
            sub: None,
            role: None,
            subscription_status: None,
            subscription_expires_at: None,
            impersonating: false,
            error: None,
        }),
    }
}

/// POST /api/session/refresh
/// Explicit rotation, independent of the silent-refresh middleware. Reads
/// the cookie directly so a still-fresh session can be rotated too.
async fn refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let token = cookies::read_session(&jar).ok_or(AppError::Unauthenticated)?;
    let claims = app_state
        .codec
        .decode(&token)
        .map_err(|_| AppError::Unauthenticated)?;

    let fresh = app_state.session_use_cases.refresh(&claims).await?;

    let mut headers = HeaderMap::new();
    issue_cookie(&app_state, &fresh, &mut headers)?;

    Ok((headers, Json(serde_json::json!({ "ok": true }))))
}

/// POST /api/session/logout
async fn logout() -> AppResult<impl IntoResponse> {
    let mut headers = HeaderMap::new();
    cookies::clear_session(&mut headers)?;
    Ok((headers, Json(serde_json::json!({ "ok": true }))))
}

pub(crate) fn issue_cookie(
    app_state: &AppState,
    claims: &SessionClaims,
    headers: &mut HeaderMap,
) -> AppResult<()> {
    let token = app_state
        .codec
        .encode(claims)
        .map_err(|e| AppError::EncodeFailure(e.to_string()))?;
    cookies::write_session(
        headers,
        token,
        app_state.config.is_production,
        app_state.config.session_ttl,
    )
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(check_session))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use super::*;
    use crate::application::ports::market::IssuedToken;
    use crate::infra::app::create_app;
    use crate::test_utils::{MockMarketApi, retailer_claims, session_cookie_header, test_app_state};

    fn server(api: Arc<MockMarketApi>) -> (TestServer, crate::adapters::http::app_state::AppState) {
        let app_state = test_app_state(api);
        let server = TestServer::new(create_app(app_state.clone())).unwrap();
        (server, app_state)
    }

    #[tokio::test]
    async fn login_issues_session_cookie_and_landing_route() {
        let (server, _) = server(Arc::new(MockMarketApi::default()));

        let response = server
            .post("/api/session/login")
            .json(&serde_json::json!({ "phone": "09120000000", "password": "hunter2" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["landing"], "/shop");

        let cookie = response.cookie(cookies::SESSION_COOKIE);
        assert!(!cookie.value().is_empty());
    }

    #[tokio::test]
    async fn login_without_credentials_is_rejected() {
        let api = Arc::new(MockMarketApi::default());
        let (server, _) = server(api.clone());

        let response = server
            .post("/api/session/login")
            .json(&serde_json::json!({ "phone": "09120000000" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "INVALID_INPUT");
        assert_eq!(api.calls.lock().unwrap().login, 0);
    }

    #[tokio::test]
    async fn check_session_reports_resolved_claims() {
        let (server, app_state) = server(Arc::new(MockMarketApi::default()));
        let (name, value) = session_cookie_header(&app_state, &retailer_claims());

        let response = server
            .get("/api/session")
            .add_header("cookie", format!("{}={}", name, value))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["sub"], "u-201");
        assert_eq!(body["role"], 4);
    }

    #[tokio::test]
    async fn check_session_without_cookie_is_anonymous() {
        let (server, _) = server(Arc::new(MockMarketApi::default()));

        let response = server.get("/api/session").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["authenticated"], false);
    }

    #[tokio::test]
    async fn refresh_rotates_the_cookie() {
        let api = Arc::new(MockMarketApi::default());
        *api.refresh_result.lock().unwrap() = Some(IssuedToken {
            access_token: "at-rotated".into(),
            expires_in_secs: 3_600,
        });
        let (server, app_state) = server(api);
        let (name, value) = session_cookie_header(&app_state, &retailer_claims());

        let response = server
            .post("/api/session/refresh")
            .add_header("cookie", format!("{}={}", name, value))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let cookie = response.cookie(cookies::SESSION_COOKIE);
        let rotated = app_state.codec.decode(cookie.value()).unwrap();
        assert_eq!(rotated.access_token, "at-rotated");
    }

    #[tokio::test]
    async fn refresh_without_cookie_is_unauthenticated() {
        let (server, _) = server(Arc::new(MockMarketApi::default()));

        let response = server.post("/api/session/refresh").await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_reports_the_reason() {
        let (server, app_state) = server(Arc::new(MockMarketApi::default()));
        let mut claims = retailer_claims();
        claims.refresh_token = String::new();
        let (name, value) = session_cookie_header(&app_state, &claims);

        let response = server
            .post("/api/session/refresh")
            .add_header("cookie", format!("{}={}", name, value))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "NO_REFRESH_TOKEN");
    }

    #[tokio::test]
    async fn logout_expires_the_cookie() {
        let (server, _) = server(Arc::new(MockMarketApi::default()));

        let response = server.post("/api/session/logout").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let cookie = response.cookie(cookies::SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
    }
}

//! Impersonation routes. Invoked from programmatic UI actions, so failures
//! come back as JSON errors rather than redirects.

use axum::{
    Extension, Json, Router, extract::State, http::HeaderMap, response::IntoResponse,
    routing::post,
};
use serde::Deserialize;

use crate::adapters::http::app_state::AppState;
use crate::adapters::http::cookies;
use crate::adapters::http::routes::session::issue_cookie;
use crate::app_error::{AppError, AppResult};
use crate::domain::entities::session::SessionClaims;

#[derive(Deserialize)]
struct StartRequest {
    user_id: Option<String>,
}

/// POST /api/impersonation/start
async fn start(
    State(app_state): State<AppState>,
    claims: Option<Extension<SessionClaims>>,
    Json(body): Json<StartRequest>,
) -> AppResult<impl IntoResponse> {
    let Some(Extension(claims)) = claims else {
        return Err(AppError::Unauthenticated);
    };

    let target = body.user_id.unwrap_or_default();
    if target.is_empty() {
        return Err(AppError::InvalidInput("user_id is required".into()));
    }

    let (impersonated, landing) = app_state
        .impersonation_use_cases
        .start(&claims, &target)
        .await?;

    let mut headers = HeaderMap::new();
    issue_cookie(&app_state, &impersonated, &mut headers)?;

    Ok((
        headers,
        Json(serde_json::json!({ "ok": true, "landing": landing })),
    ))
}

/// POST /api/impersonation/stop
/// Restores the preserved admin identity. Without an active impersonation
/// the session is simply cleared: a forced sign-out, not a visible error.
async fn stop(
    State(app_state): State<AppState>,
    claims: Option<Extension<SessionClaims>>,
) -> AppResult<impl IntoResponse> {
    let mut headers = HeaderMap::new();

    if let Some(Extension(claims)) = claims {
        match app_state.impersonation_use_cases.stop(&claims) {
            Ok((restored, landing)) => {
                issue_cookie(&app_state, &restored, &mut headers)?;
                return Ok((
                    headers,
                    Json(serde_json::json!({ "ok": true, "landing": landing })),
                ));
            }
            Err(AppError::NotImpersonating) => {}
            Err(e) => return Err(e),
        }
    }

    cookies::clear_session(&mut headers)?;
    Ok((
        headers,
        Json(serde_json::json!({ "ok": true, "landing": "/login" })),
    ))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
}

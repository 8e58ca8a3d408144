//! Payment-gateway callback route.
//!
//! The gateway navigates the user's browser here after a payment attempt,
//! so every outcome is a redirect; errors never surface to the gateway.

use axum::{
    Extension, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::warn;

use crate::adapters::http::app_state::AppState;
use crate::domain::entities::session::SessionClaims;

/// Query parameters as sent by the gateway. Casing differs between gateway
/// versions, so both variants are accepted.
#[derive(Debug, Deserialize)]
struct CallbackParams {
    #[serde(alias = "Status")]
    status: Option<String>,
    #[serde(alias = "Authority")]
    authority: Option<String>,
}

/// GET /payment/callback
async fn callback(
    State(app_state): State<AppState>,
    claims: Option<Extension<SessionClaims>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(Extension(claims)) = claims else {
        // Whoever lands here without a session has nothing to reconcile.
        return Redirect::to("/login").into_response();
    };

    let status = params.status.unwrap_or_default();
    let authority = params.authority.unwrap_or_default();
    let landing = claims.role.landing_route();

    match app_state
        .payment_use_cases
        .verify_callback(&claims.access_token, &status, &authority)
        .await
    {
        Ok(outcome) => {
            tracing::info!(?outcome, authority, "payment verified");
            Redirect::to(&format!("{}/payment/success", landing)).into_response()
        }
        Err(e) => {
            warn!(error = %e, authority, "payment verification failed");
            Redirect::to(&format!("{}/payment/failure", landing)).into_response()
        }
    }
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/payment/callback", get(callback))
}

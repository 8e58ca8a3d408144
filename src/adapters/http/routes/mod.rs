pub mod gated;
pub mod impersonation;
pub mod payment;
pub mod session;

use axum::Router;

use crate::adapters::http::app_state::AppState;

/// Routes mounted under `/api`. The payment-gateway callback is a browser
/// navigation, not an API call, and is mounted separately in `create_app`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/session", session::router())
        .nest("/impersonation", impersonation::router())
        .merge(gated::router())
}

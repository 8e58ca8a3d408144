//! Role-gated panel entry points.
//!
//! The storefront panels themselves live elsewhere; these endpoints are what
//! their data loaders hit first, and they exist to put the route gate in
//! front of real handlers.

use axum::{Json, Router, middleware::from_fn, response::IntoResponse, routing::get};

use crate::adapters::http::app_state::AppState;
use crate::adapters::http::middleware::{RouteRule, require};
use crate::domain::entities::role::Role;

const SHOP: RouteRule = RouteRule::subscribed(&[Role::Retailer]);
const WHOLESALE: RouteRule = RouteRule::roles(&[Role::Wholesaler]);
const BACK_OFFICE: RouteRule = RouteRule::roles(&[Role::Admin, Role::SuperAdmin]);

async fn shop_summary() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "section": "shop" }))
}

async fn wholesale_summary() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "section": "wholesale" }))
}

async fn back_office_summary() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "section": "back-office" }))
}

pub(crate) fn router() -> Router<AppState> {
    let shop = Router::new()
        .route("/summary", get(shop_summary))
        .layer(from_fn(|req, next| require(SHOP, req, next)));

    let wholesale = Router::new()
        .route("/summary", get(wholesale_summary))
        .layer(from_fn(|req, next| require(WHOLESALE, req, next)));

    let back_office = Router::new()
        .route("/summary", get(back_office_summary))
        .layer(from_fn(|req, next| require(BACK_OFFICE, req, next)));

    Router::new()
        .nest("/shop", shop)
        .nest("/wholesale", wholesale)
        .nest("/admin", back_office)
}

//! Session cookie adapter.
//!
//! The cookie name depends on the deployment mode: production uses the
//! `__Secure-` prefixed name (browsers refuse to set it over plain HTTP),
//! development uses the plain one. Reads accept either name so a token set
//! by one build stays visible to the other during mixed-environment testing.

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::app_error::{AppError, AppResult};

pub const SECURE_SESSION_COOKIE: &str = "__Secure-bazar_session";
pub const SESSION_COOKIE: &str = "bazar_session";

pub fn cookie_name(is_production: bool) -> &'static str {
    if is_production {
        SECURE_SESSION_COOKIE
    } else {
        SESSION_COOKIE
    }
}

pub fn is_secure_name(name: &str) -> bool {
    name.starts_with("__Secure-")
}

/// Reads the session token under either deployment's name.
pub fn read_session(jar: &CookieJar) -> Option<String> {
    jar.get(SECURE_SESSION_COOKIE)
        .or_else(|| jar.get(SESSION_COOKIE))
        .map(|c| c.value().to_owned())
}

/// Builds the session cookie for the active deployment. The TTL is the
/// outer session lifetime, independent of the inner access-token expiry.
pub fn session_cookie(token: String, is_production: bool, ttl: Duration) -> Cookie<'static> {
    let name = cookie_name(is_production);
    Cookie::build((name, token))
        .http_only(true)
        .secure(is_production || is_secure_name(name))
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl)
        .build()
}

/// Appends a cookie to the headers, handling parse errors gracefully
pub fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> AppResult<()> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| AppError::Internal("Failed to build cookie header".into()))?;
    headers.append("set-cookie", value);
    Ok(())
}

/// Appends the issued session cookie for the active deployment.
pub fn write_session(
    headers: &mut HeaderMap,
    token: String,
    is_production: bool,
    ttl: Duration,
) -> AppResult<()> {
    append_cookie(headers, session_cookie(token, is_production, ttl))
}

/// Clears the session under both names; the stray variant from a previous
/// deployment mode would otherwise survive a sign-out.
pub fn clear_session(headers: &mut HeaderMap) -> AppResult<()> {
    for name in [SECURE_SESSION_COOKIE, SESSION_COOKIE] {
        let cookie = Cookie::build((name, ""))
            .http_only(true)
            .secure(is_secure_name(name))
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds(0))
            .build();
        append_cookie(headers, cookie)?;
    }
    Ok(())
}

use std::{env, net::SocketAddr};

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    /// Shared signing secret for the session token. Required; a deployment
    /// without it must not come up.
    pub session_secret: SecretString,
    /// Outer session lifetime (cookie Max-Age and token expiry), independent
    /// of the inner access-token expiry.
    pub session_ttl: Duration,
    /// Lifetime of an impersonation-scoped access token.
    pub impersonation_ttl: Duration,
    /// Controls the cookie name and its `Secure` attribute.
    pub is_production: bool,
    pub market_api_base: Url,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let session_secret: SecretString = env::var("SESSION_SECRET")
            .expect("SESSION_SECRET must be set")
            .into();

        let session_ttl_days: i64 = env::var("SESSION_TTL_DAYS")
            .unwrap_or("30".to_string())
            .parse()
            .expect("SESSION_TTL_DAYS must be a valid number");

        let impersonation_ttl_secs: i64 = env::var("IMPERSONATION_TTL_SECS")
            .unwrap_or("3600".to_string())
            .parse()
            .expect("IMPERSONATION_TTL_SECS must be a valid number");

        let is_production = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let market_api_base: Url = env::var("MARKET_API_BASE")
            .expect("MARKET_API_BASE must be set")
            .parse()
            .expect("MARKET_API_BASE must be a valid URL");

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or("127.0.0.1:3001".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let cors_origin: HeaderValue = env::var("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");

        Self {
            session_secret,
            session_ttl: Duration::days(session_ttl_days),
            impersonation_ttl: Duration::seconds(impersonation_ttl_secs),
            is_production,
            market_api_base,
            bind_addr,
            cors_origin,
        }
    }
}

//! Signed session token codec.
//!
//! Wraps `SessionClaims` in an HS256 token with its own outer expiry. The
//! outer TTL bounds how long a browser can hold a session at all; the inner
//! access-token expiry only controls when a refresh runs. The signing secret
//! is injected at construction and nothing in here performs I/O.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::domain::entities::session::SessionClaims;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),
}

/// Wire payload: registered outer-expiry claims beside the session fields.
#[derive(Serialize, Deserialize)]
struct TokenPayload {
    exp: i64,
    iat: i64,
    #[serde(flatten)]
    session: SessionClaims,
}

pub struct SessionCodec {
    secret: SecretString,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    pub fn encode(&self, session: &SessionClaims) -> Result<String, TokenError> {
        self.encode_with_ttl(session, self.ttl)
    }

    fn encode_with_ttl(
        &self,
        session: &SessionClaims,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let payload = TokenPayload {
            exp: now + ttl.whole_seconds(),
            iat: now,
            session: session.clone(),
        };
        let header = Header::new(Algorithm::HS256);
        encode(
            &header,
            &payload,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| TokenError::Malformed(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<TokenPayload>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims.session)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        })
    }
}

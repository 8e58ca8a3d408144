use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Session carries no refresh token")]
    NoRefreshToken,

    #[error("Refresh rejected: {0}")]
    RefreshFailed(String),

    #[error("Marketplace API unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Session encoding failed: {0}")]
    EncodeFailure(String),

    #[error("No impersonation to unwind")]
    NotImpersonating,

    #[error("Impersonation target not found")]
    TargetMissing,

    #[error("Gateway reported an unsuccessful payment")]
    GatewayRejected,

    #[error("Payment authority rejected by the marketplace API")]
    InvalidAuthority,

    #[error("Payment verification inconclusive")]
    TransientFailure,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    Unauthenticated,
    Forbidden,
    NoRefreshToken,
    RefreshFailed,
    BackendUnavailable,
    EncodeFailure,
    NotImpersonating,
    TargetMissing,
    GatewayRejected,
    InvalidAuthority,
    TransientFailure,
    InvalidInput,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NoRefreshToken => "NO_REFRESH_TOKEN",
            ErrorCode::RefreshFailed => "REFRESH_FAILED",
            ErrorCode::BackendUnavailable => "BACKEND_UNAVAILABLE",
            ErrorCode::EncodeFailure => "ENCODE_FAILURE",
            ErrorCode::NotImpersonating => "NOT_IMPERSONATING",
            ErrorCode::TargetMissing => "TARGET_MISSING",
            ErrorCode::GatewayRejected => "GATEWAY_REJECTED",
            ErrorCode::InvalidAuthority => "INVALID_AUTHORITY",
            ErrorCode::TransientFailure => "TRANSIENT_FAILURE",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        let (status, code) = match &self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, ErrorCode::Unauthenticated),
            AppError::NoRefreshToken => (StatusCode::UNAUTHORIZED, ErrorCode::NoRefreshToken),
            // A rejected refresh forces re-login; the status says so.
            AppError::RefreshFailed(_) => (StatusCode::UNAUTHORIZED, ErrorCode::RefreshFailed),
            AppError::NotImpersonating => (StatusCode::UNAUTHORIZED, ErrorCode::NotImpersonating),
            AppError::Forbidden => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::TargetMissing => (StatusCode::NOT_FOUND, ErrorCode::TargetMissing),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInput),
            AppError::GatewayRejected => (StatusCode::BAD_REQUEST, ErrorCode::GatewayRejected),
            AppError::InvalidAuthority => (StatusCode::BAD_REQUEST, ErrorCode::InvalidAuthority),
            AppError::TransientFailure => (StatusCode::BAD_GATEWAY, ErrorCode::TransientFailure),
            AppError::BackendUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::BackendUnavailable,
            ),
            AppError::EncodeFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::EncodeFailure)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError),
        };

        let body = serde_json::json!({ "ok": false, "error": code.as_str() });
        (status, Json(body)).into_response()
    }
}

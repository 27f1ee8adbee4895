use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain error taxonomy. Every handler failure passes through here and is
/// translated to a status code and a JSON `{"message": ...}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unusable request input.
    #[error("{0}")]
    BadRequest(String),

    /// Input present but malformed (field-level validation).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation (username/email already taken).
    #[error("{0}")]
    Duplicate(String),

    /// Login failure. One message for unknown email and wrong password, so
    /// responses cannot be used to enumerate accounts.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No bearer token on a protected route.
    #[error("Missing authentication token")]
    MissingToken,

    /// Token failed structural or signature checks.
    #[error("Invalid token")]
    InvalidToken,

    /// Token is past its expiry.
    #[error("Token expired")]
    TokenExpired,

    /// Ownership-scoped lookup miss.
    #[error("{0}")]
    NotFound(String),

    /// Search service could not be reached at all.
    #[error("{0}")]
    Upstream(String),

    /// Unexpected store or runtime failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) | ApiError::Duplicate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                json!({ "message": "Internal server error", "error": e.to_string() })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Duplicate("taken".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::NotFound("gone".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Upstream("down".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn expired_and_invalid_tokens_are_distinguishable() {
        assert_ne!(
            ApiError::TokenExpired.to_string(),
            ApiError::InvalidToken.to_string()
        );
    }

    #[test]
    fn invalid_credentials_message_is_factor_independent() {
        // The same variant serves both the unknown-email and wrong-password
        // paths, so the message cannot differ between them.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}

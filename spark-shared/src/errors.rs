use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{domain}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Relations errors (matches, blocks, likes, visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    ServiceUnavailable,
    BadRequest,

    // Auth (E1xxx)
    TokenExpired,
    TokenInvalid,

    // Relations (E2xxx)
    InvalidIdentifier,
    NotRelationParticipant,
    MatchNotFound,
    ProfileNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::ServiceUnavailable => "E0007",
            Self::BadRequest => "E0008",

            // Auth
            Self::TokenExpired => "E1004",
            Self::TokenInvalid => "E1005",

            // Relations
            Self::InvalidIdentifier => "E2001",
            Self::NotRelationParticipant => "E2002",
            Self::MatchNotFound => "E2003",
            Self::ProfileNotFound => "E2004",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ValidationError | Self::BadRequest | Self::InvalidIdentifier => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::MatchNotFound | Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::TokenExpired | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotRelationParticipant => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database pool checkout failed or the store refused the connection.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// The code this error renders with, for logging and tests.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Known { code, .. } => *code,
            AppError::Internal(_) => ErrorCode::InternalError,
            AppError::Database(diesel::result::Error::NotFound) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::InternalError,
            AppError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                if status.is_server_error() {
                    tracing::error!(code = code.code(), "{message}");
                }
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let (status, value) = body_json(AppError::new(ErrorCode::MatchNotFound, "match 4 not found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E2003");
        assert_eq!(value["error"]["message"], "match 4 not found");
        assert!(value["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn details_are_rendered() {
        let err = AppError::with_details(
            ErrorCode::InvalidIdentifier,
            "invalid identifier",
            serde_json::json!({ "value": -3 }),
        );
        let (status, value) = body_json(err).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["error"]["details"]["value"], -3);
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let (status, value) = body_json(AppError::Database(diesel::result::Error::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["error"]["code"], "E0003");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let (status, value) = body_json(AppError::Internal(anyhow::anyhow!("pool poisoned"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["error"]["message"], "internal server error");
    }

    #[test]
    fn relation_codes_have_expected_statuses() {
        assert_eq!(ErrorCode::InvalidIdentifier.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::NotRelationParticipant.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ProfileNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AppError::unavailable("db down").error_code(), ErrorCode::ServiceUnavailable);
    }
}

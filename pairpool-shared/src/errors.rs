use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Pool errors
/// - E2xxx: Matching errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    BadRequest,
    ServiceUnavailable,

    // Pool (E1xxx)
    PoolNotFound,
    MemberNotFound,
    MemberAlreadyExists,

    // Matching (E2xxx)
    MatchNotFound,
    NotInMatch,
    SameParticipant,
    ParticipantNotInPool,
    DuplicateMatch,
    InvalidStatus,
    InvalidDecision,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::BadRequest => "E0004",
            Self::ServiceUnavailable => "E0005",

            // Pool
            Self::PoolNotFound => "E1001",
            Self::MemberNotFound => "E1002",
            Self::MemberAlreadyExists => "E1003",

            // Matching
            Self::MatchNotFound => "E2001",
            Self::NotInMatch => "E2002",
            Self::SameParticipant => "E2003",
            Self::ParticipantNotInPool => "E2004",
            Self::DuplicateMatch => "E2005",
            Self::InvalidStatus => "E2006",
            Self::InvalidDecision => "E2007",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::BadRequest | Self::SameParticipant
            | Self::InvalidStatus | Self::InvalidDecision => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::PoolNotFound | Self::MemberNotFound
            | Self::MatchNotFound => StatusCode::NOT_FOUND,
            Self::NotInMatch | Self::ParticipantNotInPool => StatusCode::FORBIDDEN,
            Self::MemberAlreadyExists | Self::DuplicateMatch => StatusCode::CONFLICT,
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

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
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

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn known_error_envelope() {
        let value = body_json(AppError::new(ErrorCode::MatchNotFound, "match not found")).await;
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E2001");
        assert_eq!(value["error"]["message"], "match not found");
    }

    #[tokio::test]
    async fn status_mapping() {
        assert_eq!(ErrorCode::NotInMatch.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::MatchNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::DuplicateMatch.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::SameParticipant.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ParticipantNotInPool.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn diesel_not_found_maps_to_404() {
        let err = AppError::Database(diesel::result::Error::NotFound);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_error_does_not_leak() {
        let value = body_json(AppError::Internal(anyhow::anyhow!("connection refused"))).await;
        assert_eq!(value["error"]["code"], "E0001");
        assert_eq!(value["error"]["message"], "internal server error");
    }
}

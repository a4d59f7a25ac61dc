//! API error types.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reel_pipeline::PipelineStage;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("Invalid user ID format")]
    InvalidUserId,

    #[error("{message}")]
    BadRequest { code: &'static str, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Insufficient credits: {required} required")]
    InsufficientCredits { required: i32 },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("video processing failed at {0} stage")]
    Processing(PipelineStage),

    #[error("{0}")]
    InvalidSignature(String),

    #[error("Failed to process webhook: {0}")]
    WebhookProcessing(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] reel_storage::StorageError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn bad_request(code: &'static str, msg: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: msg.into(),
        }
    }

    pub fn not_found(code: &'static str, msg: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Machine-readable error code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InvalidUserId => "invalid_user_id",
            ApiError::BadRequest { code, .. } | ApiError::NotFound { code, .. } => code,
            ApiError::Validation(_) => "validation_error",
            ApiError::InsufficientCredits { .. } => "insufficient_credits",
            ApiError::RateLimited => "rate_limited",
            ApiError::Processing(_) => "processing_error",
            ApiError::InvalidSignature(_) => "invalid_signature",
            ApiError::WebhookProcessing(_) => "webhook_processing_failed",
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Storage(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidUserId
            | ApiError::BadRequest { .. }
            | ApiError::Validation(_)
            | ApiError::InvalidSignature(_) => StatusCode::BAD_REQUEST,
            ApiError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Processing(_)
            | ApiError::WebhookProcessing(_)
            | ApiError::Internal(_)
            | ApiError::Database(_)
            | ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Storage(_)
        )
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("invalid_request", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("invalid_parameter", rejection.body_text())
    }
}

/// Error envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        // Don't expose internal error details in production
        let message = if self.is_internal()
            && std::env::var("ENVIRONMENT").unwrap_or_default() == "production"
        {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (ApiError::unauthorized("no token"), 401, "unauthorized"),
            (ApiError::InvalidUserId, 400, "invalid_user_id"),
            (ApiError::bad_request("missing_price_id", "x"), 400, "missing_price_id"),
            (ApiError::InsufficientCredits { required: 10 }, 402, "insufficient_credits"),
            (ApiError::not_found("hook_not_found", "x"), 404, "hook_not_found"),
            (ApiError::Processing(PipelineStage::Render), 500, "processing_error"),
            (ApiError::InvalidSignature("bad".into()), 400, "invalid_signature"),
            (ApiError::WebhookProcessing("x".into()), 500, "webhook_processing_failed"),
            (ApiError::Database(sqlx::Error::RowNotFound), 500, "internal_error"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{:?}", err);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_processing_message_names_stage_only() {
        let err = ApiError::Processing(PipelineStage::Thumbnail);
        assert_eq!(err.to_string(), "video processing failed at thumbnail stage");
    }
}

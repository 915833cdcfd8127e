use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Every ingest-surface failure mode from §7, mapped to one HTTP status. No
/// stringly-typed error paths: callers match on the variant, not the message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid patch: {0}")]
    Validation(#[from] polyglot_core::ValidationError),

    #[error("room not found: {0}")]
    RoomNotFound(String),

    #[error("room mailbox unavailable, retry")]
    MailboxFull,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RoomNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MailboxFull => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!(error = %self, "ingest_retriable_failure");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use vidshelf_core::VidshelfError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] VidshelfError),
}

impl From<vidshelf_storage::StorageError> for ServerError {
    fn from(err: vidshelf_storage::StorageError) -> Self {
        // Convert StorageError -> VidshelfError -> ServerError
        ServerError::Domain(err.into())
    }
}

impl From<sqlx::Error> for ServerError {
    fn from(err: sqlx::Error) -> Self {
        ServerError::Domain(err.into())
    }
}

impl ServerError {
    /// HTTP status and client-facing message
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Domain(e) if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            ServerError::Domain(e) if e.is_validation() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ServerError::Domain(VidshelfError::PermissionDenied(msg)) => {
                (StatusCode::FORBIDDEN, msg.clone())
            }
            ServerError::Domain(VidshelfError::InvariantViolation(msg)) => {
                tracing::error!("Invariant violation: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Domain(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let mut body = json!({
            "error": error_message,
        });
        if let ServerError::Domain(VidshelfError::VideosNotFound(ids)) = &self {
            body["missing_video_ids"] = json!(ids);
        }

        (status, Json(body)).into_response()
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use legalgpt_persist::PersistError;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ThreadNotFound(id) => Self::ThreadNotFound(id),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::ThreadNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Thread '{}' not found", id))
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                // Detail stays in the logs.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

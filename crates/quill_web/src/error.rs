use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::Error;
use quill_scrapers::JobFailure;
use serde_json::json;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Job(#[from] JobFailure),

    #[error(transparent)]
    Core(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound | ApiError::Core(Error::NotFound(_)) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response()
            }
            ApiError::BadRequest(detail) => {
                tracing::debug!("Rejected request: {}", detail);
                (StatusCode::BAD_REQUEST, Json(json!({ "message": "Bad request" }))).into_response()
            }
            ApiError::Job(failure) if failure.is_conflict() => (
                StatusCode::CONFLICT,
                Json(json!({ "message": failure.source.to_string() })),
            )
                .into_response(),
            ApiError::Job(failure) => {
                tracing::error!("Error executing {} job: {}", failure.kind, failure.source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": failure.to_string(), "details": failure.output })),
                )
                    .into_response()
            }
            ApiError::Core(e) => {
                tracing::error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Server error" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

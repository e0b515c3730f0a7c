use crate::services::pipeline::PipelineError;
use crate::services::transform::TransformError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Unsupported file type: .{0}")]
    UnsupportedType(String),

    #[error("Invalid PDF file")]
    InvalidPdf,

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Compression failed: {0}")]
    Transform(TransformError),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::NoFile => AppError::NoFile,
            PipelineError::UnsupportedType(ext) => AppError::UnsupportedType(ext),
            PipelineError::Transform(TransformError::InvalidDocument) => AppError::InvalidPdf,
            PipelineError::Transform(e) => AppError::Transform(e),
            PipelineError::Storage(e) => AppError::Internal(format!("Storage Area failure: {}", e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::NoFile => (StatusCode::BAD_REQUEST, "No file uploaded".to_string(), None),
            AppError::UnsupportedType(ext) => (
                StatusCode::BAD_REQUEST,
                "Unsupported file type".to_string(),
                Some(format!(".{}", ext)),
            ),
            AppError::InvalidPdf => (StatusCode::BAD_REQUEST, "Invalid PDF file".to_string(), None),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::BAD_REQUEST, "File too large".to_string(), Some(msg))
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Transform(e) => {
                tracing::error!("Transform error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Compression failed".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    None,
                )
            }
        };

        let body = match details {
            Some(details) => Json(json!({ "error": message, "details": details })),
            None => Json(json!({ "error": message })),
        };

        (status, body).into_response()
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::GenerationError;
use crate::pipeline::PipelineError;
use crate::render::RenderError;

pub const EXTRACTION_MESSAGE: &str =
    "Could not read your document. Please upload a valid PDF resume.";
pub const GENERATION_MESSAGE: &str =
    "The analysis service is unavailable. Please try again later.";
pub const RENDER_MESSAGE: &str = "Could not produce a file from this text.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        tracing::debug!(stage = %err.stage(), "mapping pipeline failure to response");
        match err {
            PipelineError::Extraction(e) => AppError::Extraction(e),
            PipelineError::Generation { source, .. } => AppError::Generation(source),
        }
    }
}

impl AppError {
    /// Message safe to show an end user. Each failure class reads differently.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Extraction(_) => EXTRACTION_MESSAGE.to_string(),
            AppError::Generation(_) => GENERATION_MESSAGE.to_string(),
            AppError::Render(_) => RENDER_MESSAGE.to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Logs the underlying cause. Validation failures are the caller's fault and stay quiet.
    pub fn log(&self) {
        match self {
            AppError::Validation(_) => {}
            AppError::Extraction(e) => tracing::error!("PDF extraction error: {e}"),
            AppError::Generation(e) => tracing::error!("Gemini error: {e}"),
            AppError::Render(e) => tracing::error!("Render error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}

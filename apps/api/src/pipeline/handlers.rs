//! Axum route handlers for the JSON API front-end.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "AI_Generated_Cover_Letter.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resume_text: String,
    pub missing_keywords: String,
    pub suggestions: String,
}

#[derive(Debug, Deserialize)]
pub struct CoverLetterRequest {
    pub resume_text: String,
    pub job_description: String,
    pub missing_keywords: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
}

/// The two fields of an upload form: the résumé file and the pasted job description.
#[derive(Debug)]
pub struct UploadForm {
    pub resume: Bytes,
    pub job_description: String,
}

impl UploadForm {
    /// Reads `resume` (file) and `job_description` (text) from a multipart body.
    /// Unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut resume = None;
        let mut job_description = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("resume") => {
                    let data = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read resume upload: {e}"))
                    })?;
                    resume = Some(data);
                }
                Some("job_description") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read job_description: {e}"))
                    })?;
                    job_description = Some(text);
                }
                _ => {}
            }
        }

        let resume = resume
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AppError::Validation("Please upload your resume.".to_string()))?;
        let job_description = require_job_description(job_description.unwrap_or_default())?;

        Ok(Self {
            resume,
            job_description,
        })
    }
}

pub fn require_job_description(job_description: String) -> Result<String, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please paste the job description.".to_string(),
        ));
    }
    Ok(job_description)
}

pub fn require_resume_text(resume_text: String) -> Result<String, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text is required. Run the analysis first.".to_string(),
        ));
    }
    Ok(resume_text)
}

/// Wraps rendered bytes as a PDF download.
pub fn pdf_attachment(bytes: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart upload of `resume` + `job_description`. Extracts the résumé text and
/// returns the gap analysis sections.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = UploadForm::from_multipart(multipart).await?;

    let analysis = state
        .pipeline
        .analyze(&form.resume, &form.job_description)
        .await?;

    Ok(Json(AnalyzeResponse {
        resume_text: analysis.resume_text,
        missing_keywords: analysis.missing_keywords,
        suggestions: analysis.suggestions,
    }))
}

/// POST /api/v1/cover-letter
///
/// Drafts a cover letter from a previous analysis.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let resume_text = require_resume_text(request.resume_text)?;
    let job_description = require_job_description(request.job_description)?;

    let cover_letter = state
        .pipeline
        .draft_cover_letter(
            &resume_text,
            &job_description,
            &request.missing_keywords,
        )
        .await?;

    Ok(Json(CoverLetterResponse { cover_letter }))
}

/// POST /api/v1/render
///
/// Renders arbitrary text to a PDF attachment.
pub async fn handle_render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let bytes = state.renderer.render(&request.text).await?;
    Ok(pdf_attachment(bytes))
}

//! Server-rendered page front-end.
//!
//! Upload form → full pipeline run → suggestions plus an editable letter → PDF download.
//! Shares the pipeline and renderer with the JSON API; only presentation differs.
//! Errors are shown inline on the form page instead of as JSON.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::handlers::{pdf_attachment, UploadForm};
use crate::pipeline::CareerPackage;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultPage {
    missing_keywords: String,
    suggestions: String,
    cover_letter: String,
}

impl From<CareerPackage> for ResultPage {
    fn from(package: CareerPackage) -> Self {
        Self {
            missing_keywords: package.analysis.missing_keywords,
            suggestions: package.analysis.suggestions,
            cover_letter: package.cover_letter,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub text: String,
}

/// GET /
pub async fn handle_index() -> Response {
    page(StatusCode::OK, &IndexPage { error: None })
}

/// POST /ui/generate
pub async fn handle_generate(State(state): State<AppState>, multipart: Multipart) -> Response {
    match generate(&state, multipart).await {
        Ok(package) => {
            info!("Successfully generated content for user");
            page(StatusCode::OK, &ResultPage::from(package))
        }
        Err(err) => error_page(err),
    }
}

/// POST /ui/download
pub async fn handle_download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Response {
    match state.renderer.render(&form.text).await {
        Ok(bytes) => pdf_attachment(bytes),
        Err(err) => error_page(err.into()),
    }
}

async fn generate(state: &AppState, multipart: Multipart) -> Result<CareerPackage, AppError> {
    let form = UploadForm::from_multipart(multipart).await?;
    let package = state
        .pipeline
        .run(&form.resume, &form.job_description)
        .await?;
    Ok(package)
}

fn error_page(err: AppError) -> Response {
    err.log();
    let status = err.status();
    page(
        status,
        &IndexPage {
            error: Some(err.user_message()),
        },
    )
}

fn page<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::Internal(anyhow::anyhow!("template render failed: {e}")).into_response(),
    }
}

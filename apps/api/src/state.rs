use std::sync::Arc;

use crate::pipeline::CoverLetterPipeline;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every handler call is an independent pipeline run.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<CoverLetterPipeline>,
    /// Pluggable renderer. Default: PdfRenderer on US letter.
    pub renderer: Arc<dyn DocumentRenderer>,
}

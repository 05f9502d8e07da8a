mod config;
mod errors;
mod extraction;
mod llm_client;
mod pipeline;
mod render;
mod routes;
mod state;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::PdfTextExtractor;
use crate::llm_client::GeminiClient;
use crate::pipeline::CoverLetterPipeline;
use crate::render::metrics::PageConfig;
use crate::render::PdfRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing GEMINI_API_KEY stops the process here.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Co-Pilot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", config.gemini_model);

    let pipeline = CoverLetterPipeline::new(Arc::new(PdfTextExtractor), Arc::new(llm));

    let page_config = PageConfig::letter();
    info!(
        "Render page config: {}x{}pt, {}pt text",
        page_config.page_width_pt, page_config.page_height_pt, page_config.font_size_pt
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        renderer: Arc::new(PdfRenderer::new(page_config)),
    };

    let app = build_router(state, config.max_upload_mb * 1024 * 1024)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Cover letter pipeline: prompt templates, gap-analysis parsing, orchestration.
// Shared by both front-ends; handlers.rs is the JSON API adapter.
// All LLM calls go through llm_client, never directly from here.

pub mod handlers;
pub mod orchestrator;
pub mod parser;
pub mod prompts;

pub use orchestrator::{CareerPackage, CoverLetterPipeline, PipelineError};

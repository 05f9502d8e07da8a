//! Cover Letter Pipeline: orchestrates extraction, gap analysis, parsing, and letter drafting.
//!
//! Flow: Start → Extracting → Analyzing → Parsed → DraftingLetter → Done.
//! Any collaborator failure ends the run as `Failed`, carrying the original error and
//! the stage it happened in. Nothing is mutated externally, so nothing is rolled back.
//!
//! The pipeline holds no per-request state and is shared across requests behind an `Arc`.
//! The two generation calls are strictly sequential: the letter prompt needs the parsed
//! keywords from the first call.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::extraction::{DocumentExtractor, ExtractionError};
use crate::llm_client::{GenerationError, TextGenerator};
use crate::pipeline::parser::{parse_gap_analysis, ParseOutcome};
use crate::pipeline::prompts::{build_cover_letter_prompt, build_gap_analysis_prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Extracting,
    Analyzing,
    Parsed,
    DraftingLetter,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::Extracting => "extracting",
            Stage::Analyzing => "analyzing",
            Stage::Parsed => "parsed",
            Stage::DraftingLetter => "drafting_letter",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal `Failed` state of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not extract resume text: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("generation failed while {stage}: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },
}

impl PipelineError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Extraction(_) => Stage::Extracting,
            PipelineError::Generation { stage, .. } => *stage,
        }
    }
}

/// Output of `analyze`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub resume_text: String,
    pub missing_keywords: String,
    pub suggestions: String,
}

/// Output of a full `run`: the analysis plus the drafted letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerPackage {
    pub analysis: Analysis,
    pub cover_letter: String,
}

pub struct CoverLetterPipeline {
    extractor: Arc<dyn DocumentExtractor>,
    generator: Arc<dyn TextGenerator>,
}

impl CoverLetterPipeline {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            extractor,
            generator,
        }
    }

    /// Model identifier the generator is bound to.
    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Extracts the résumé and runs the gap analysis. Stops at `Parsed`.
    pub async fn analyze(
        &self,
        document: &[u8],
        job_description: &str,
    ) -> Result<Analysis, PipelineError> {
        let span = info_span!("pipeline", op = "analyze", run_id = %Uuid::new_v4());
        self.extract_and_analyze(document, job_description)
            .instrument(span)
            .await
    }

    /// Drafts the cover letter from an earlier analysis. Runs `DraftingLetter → Done`.
    pub async fn draft_cover_letter(
        &self,
        resume_text: &str,
        job_description: &str,
        missing_keywords: &str,
    ) -> Result<String, PipelineError> {
        let span = info_span!("pipeline", op = "cover_letter", run_id = %Uuid::new_v4());
        self.draft(resume_text, job_description, missing_keywords)
            .instrument(span)
            .await
    }

    /// Runs the whole state machine from uploaded bytes to a drafted letter.
    pub async fn run(
        &self,
        document: &[u8],
        job_description: &str,
    ) -> Result<CareerPackage, PipelineError> {
        let span = info_span!("pipeline", op = "run", run_id = %Uuid::new_v4());
        async move {
            let analysis = self.extract_and_analyze(document, job_description).await?;
            let cover_letter = self
                .draft(
                    &analysis.resume_text,
                    job_description,
                    &analysis.missing_keywords,
                )
                .await?;
            Ok(CareerPackage {
                analysis,
                cover_letter,
            })
        }
        .instrument(span)
        .await
    }

    async fn extract_and_analyze(
        &self,
        document: &[u8],
        job_description: &str,
    ) -> Result<Analysis, PipelineError> {
        info!(stage = %Stage::Start, "pipeline started");
        info!(stage = %Stage::Extracting, "extracting resume text from {} bytes", document.len());
        let resume_text = self.extractor.extract(document).await.map_err(|e| {
            warn!(stage = %Stage::Extracting, "extraction failed: {e}");
            PipelineError::from(e)
        })?;

        info!(
            stage = %Stage::Analyzing,
            model = self.generator.model(),
            "requesting gap analysis ({} chars of resume text)",
            resume_text.len()
        );
        let prompt = build_gap_analysis_prompt(&resume_text, job_description);
        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|source| failed(Stage::Analyzing, source))?;

        let parsed = parse_gap_analysis(&raw);
        if parsed.outcome == ParseOutcome::Unstructured {
            warn!(
                stage = %Stage::Parsed,
                "gap analysis did not contain the expected separators; returning raw output"
            );
        } else {
            info!(stage = %Stage::Parsed, "gap analysis parsed");
        }

        Ok(Analysis {
            resume_text,
            missing_keywords: parsed.missing_keywords,
            suggestions: parsed.suggestions,
        })
    }

    async fn draft(
        &self,
        resume_text: &str,
        job_description: &str,
        missing_keywords: &str,
    ) -> Result<String, PipelineError> {
        info!(stage = %Stage::DraftingLetter, model = self.generator.model(), "drafting cover letter");
        let prompt = build_cover_letter_prompt(resume_text, job_description, missing_keywords);
        let cover_letter = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|source| failed(Stage::DraftingLetter, source))?;

        info!(stage = %Stage::Done, "cover letter drafted ({} chars)", cover_letter.len());
        Ok(cover_letter)
    }
}

fn failed(stage: Stage, source: GenerationError) -> PipelineError {
    warn!(stage = %stage, "generation failed: {source}");
    PipelineError::Generation { stage, source }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::pipeline::parser::{END_MARKER, MISSING_KEYWORDS_MARKER};

    /// Extractor returning a fixed result and counting invocations.
    pub(crate) struct StubExtractor {
        pub result: Result<String, ()>,
        pub calls: AtomicUsize,
    }

    impl StubExtractor {
        pub fn ok(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                result: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentExtractor for StubExtractor {
        async fn extract(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .map_err(|_| ExtractionError::Unreadable("bad header".to_string()))
        }
    }

    /// Generator that replays scripted responses and records every prompt it received.
    pub(crate) struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, u16>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(responses: Vec<Result<&str, u16>>) -> Self {
            Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(status)) => Err(GenerationError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
                None => Err(GenerationError::EmptyContent),
            }
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    pub(crate) const GAP_RESPONSE: &str = "---MISSING_KEYWORDS---\n- Docker\n---RESUME_SUGGESTIONS---\n**For Docker:**\n- Deployed 10 containers\n---END---";
    pub(crate) const LETTER: &str = "Dear Hiring Manager,\n\nI am excited...\n\nSincerely,";

    fn pipeline(
        extractor: &Arc<StubExtractor>,
        generator: &Arc<ScriptedGenerator>,
    ) -> CoverLetterPipeline {
        CoverLetterPipeline::new(extractor.clone(), generator.clone())
    }

    #[tokio::test]
    async fn test_analyze_returns_parsed_sections() {
        let extractor = Arc::new(StubExtractor::ok("Skilled in Python.\n5 years experience."));
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(GAP_RESPONSE)]));

        let analysis = pipeline(&extractor, &generator)
            .analyze(b"%PDF", "Needs Docker")
            .await
            .unwrap();

        assert_eq!(analysis.resume_text, "Skilled in Python.\n5 years experience.");
        assert_eq!(analysis.missing_keywords, "- Docker");
        assert_eq!(analysis.suggestions, "**For Docker:**\n- Deployed 10 containers");
        assert_eq!(generator.call_count(), 1);

        let prompt = &generator.prompts.lock().unwrap()[0];
        assert!(prompt.contains("Skilled in Python.\n5 years experience."));
        assert!(prompt.contains("Needs Docker"));
        assert!(prompt.contains(MISSING_KEYWORDS_MARKER));
    }

    #[tokio::test]
    async fn test_analyze_tolerates_unstructured_output() {
        let extractor = Arc::new(StubExtractor::ok("resume"));
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
            "I could not complete this analysis.",
        )]));

        let analysis = pipeline(&extractor, &generator)
            .analyze(b"%PDF", "jd")
            .await
            .unwrap();

        assert_eq!(analysis.missing_keywords, "");
        assert_eq!(analysis.suggestions, "I could not complete this analysis.");
    }

    #[tokio::test]
    async fn test_repeated_analyze_is_not_cached() {
        let extractor = Arc::new(StubExtractor::ok("resume"));
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(GAP_RESPONSE),
            Ok(GAP_RESPONSE),
        ]));
        let pipeline = pipeline(&extractor, &generator);

        let first = pipeline.analyze(b"same bytes", "same jd").await.unwrap();
        let second = pipeline.analyze(b"same bytes", "same jd").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(generator.call_count(), 2);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_issues_no_generation_call() {
        let extractor = Arc::new(StubExtractor::failing());
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(GAP_RESPONSE), Ok(LETTER)]));

        let err = pipeline(&extractor, &generator)
            .run(b"not a pdf", "jd")
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Extraction(_)));
        assert_eq!(err.stage(), Stage::Extracting);
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_never_builds_letter_prompt() {
        let extractor = Arc::new(StubExtractor::ok("resume"));
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(503), Ok(LETTER)]));

        let err = pipeline(&extractor, &generator)
            .run(b"%PDF", "jd")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Analyzing);
        match err {
            PipelineError::Generation {
                source: GenerationError::Api { status, .. },
                ..
            } => assert_eq!(status, 503),
            other => panic!("expected generation failure, got {other:?}"),
        }
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(END_MARKER));
    }

    #[tokio::test]
    async fn test_run_feeds_parsed_keywords_into_letter_prompt() {
        let extractor = Arc::new(StubExtractor::ok("Skilled in Python."));
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(GAP_RESPONSE), Ok(LETTER)]));

        let package = pipeline(&extractor, &generator)
            .run(b"%PDF", "Backend role, Docker required")
            .await
            .unwrap();

        assert_eq!(package.cover_letter, LETTER);
        assert_eq!(package.analysis.missing_keywords, "- Docker");

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Dear Hiring Manager,"));
        assert!(prompts[1].ends_with("- Docker"));
        assert!(prompts[1].contains("Backend role, Docker required"));
    }

    #[tokio::test]
    async fn test_letter_failure_is_reported_at_drafting_stage() {
        let extractor = Arc::new(StubExtractor::ok("resume"));
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(GAP_RESPONSE), Err(429)]));

        let err = pipeline(&extractor, &generator)
            .run(b"%PDF", "jd")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::DraftingLetter);
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_draft_cover_letter_standalone() {
        let extractor = Arc::new(StubExtractor::ok("unused"));
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(LETTER)]));

        let letter = pipeline(&extractor, &generator)
            .draft_cover_letter("resume", "jd", "- Kafka")
            .await
            .unwrap();

        assert_eq!(letter, LETTER);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert!(generator.prompts.lock().unwrap()[0].ends_with("- Kafka"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::DraftingLetter.to_string(), "drafting_letter");
        assert_eq!(Stage::Analyzing.to_string(), "analyzing");
    }
}

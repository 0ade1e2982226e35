//! Study service coordinating extraction, chunking, and sequenced generation.

use crate::{
    config::Config,
    extract::{self, DocumentText},
    generation::{GeminiClient, GenerationClientError, LlmStudyGenerator, StudyGenerator},
    metrics::{MetricsSnapshot, RunMetrics},
    pipeline::{
        chunking::chunk_text,
        dispatch::Dispatcher,
        sequencer::{Sequencer, SequencerObserver},
        types::{PipelineError, StudyRequest, StudyRun},
    },
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::Instrument;

/// Coordinates the full pipeline: extraction, chunking, and rate-limited generation.
///
/// The service owns the configuration, the generator, and the metrics registry so that the CLI
/// and the HTTP surface share the same components. Construct it once near process start and
/// share it through an `Arc`.
pub struct StudyService {
    config: Config,
    generator: Arc<dyn StudyGenerator>,
    metrics: Arc<RunMetrics>,
    observer: Option<Arc<dyn SequencerObserver>>,
}

/// Abstraction over the study pipeline used by external surfaces (HTTP).
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// Extract, chunk, and generate study material for an uploaded document.
    async fn process_document(
        &self,
        bytes: Vec<u8>,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl StudyService {
    /// Build a service that talks to Gemini with the supplied configuration.
    pub fn new(config: Config) -> Result<Self, GenerationClientError> {
        tracing::info!(model = %config.gemini_model, "Initializing Gemini client");
        let client = GeminiClient::new(&config)?;
        let generator = Arc::new(LlmStudyGenerator::new(Box::new(client)));
        Ok(Self::with_generator(config, generator))
    }

    /// Build a service around an arbitrary generator.
    pub fn with_generator(config: Config, generator: Arc<dyn StudyGenerator>) -> Self {
        Self {
            config,
            generator,
            metrics: Arc::new(RunMetrics::new()),
            observer: None,
        }
    }

    /// Attach a progress observer notified around every section.
    pub fn with_observer(mut self, observer: Arc<dyn SequencerObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Read a document from disk and process it.
    pub async fn process_path(
        &self,
        path: impl AsRef<Path>,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        validate(&request)?;
        let document = extract::extract_path(path).await?;
        self.process_extracted(document, request).await
    }

    /// Extract and process an in-memory document.
    pub async fn process_document(
        &self,
        bytes: Vec<u8>,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        validate(&request)?;
        let document = extract::extract_bytes(bytes).await?;
        self.process_extracted(document, request).await
    }

    /// Process already-extracted text.
    pub async fn process_text(
        &self,
        text: &str,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        validate(&request)?;
        self.run(text, None, None, request).await
    }

    async fn process_extracted(
        &self,
        document: DocumentText,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        let DocumentText {
            text,
            page_count,
            fingerprint,
        } = document;
        self.run(&text, Some(fingerprint), Some(page_count), request)
            .await
    }

    async fn run(
        &self,
        text: &str,
        document_fingerprint: Option<String>,
        page_count: Option<usize>,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("study_run", %run_id);

        async move {
            let params = self.config.chunking;
            let chunks = chunk_text(text, params);
            tracing::info!(
                sections = chunks.len(),
                chunk_size = params.max_chars(),
                overlap = params.overlap(),
                tasks = request.tasks.count(),
                "Document split into sections"
            );

            let dispatcher = Dispatcher::new(self.generator.as_ref(), request.tasks, request.options);
            let mut sequencer = Sequencer::new(dispatcher, self.config.request_delay);
            if let Some(observer) = self.observer.as_deref() {
                sequencer = sequencer.with_observer(observer);
            }
            let report = sequencer.run(&chunks).await;

            self.metrics
                .record_run(report.sections, &report.results, report.failures.len());
            tracing::info!(
                sections = report.sections,
                summaries = report.results.summaries.len(),
                questions = report.results.quizzes.len(),
                flashcards = report.results.flashcards.len(),
                failures = report.failures.len(),
                "Study run complete"
            );

            Ok(StudyRun {
                run_id,
                generated_at: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
                document_fingerprint,
                page_count,
                char_count: text.chars().count(),
                section_count: report.sections,
                request,
                results: report.results,
                failures: report.failures,
            })
        }
        .instrument(span)
        .await
    }

    /// Return the current run metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn validate(request: &StudyRequest) -> Result<(), PipelineError> {
    if !request.tasks.any() {
        return Err(PipelineError::InvalidOptions(
            "at least one of summaries, quizzes, or flashcards must be enabled".into(),
        ));
    }
    request.options.validate()
}

#[async_trait]
impl StudyApi for StudyService {
    async fn process_document(
        &self,
        bytes: Vec<u8>,
        request: StudyRequest,
    ) -> Result<StudyRun, PipelineError> {
        StudyService::process_document(self, bytes, request).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        StudyService::metrics_snapshot(self)
    }
}

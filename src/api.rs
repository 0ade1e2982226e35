//! HTTP surface for Studypack.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /process` – Upload a PDF as the raw request body and receive the generated study
//!   run (summaries, quiz questions, flashcards, per-section failures) as JSON. Task toggles
//!   and options travel in the query string.
//! - `GET /metrics` – Observe run counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The HTTP surface shares the same pipeline with the CLI, so behavior is identical across
//! interfaces.

use crate::extract::ExtractionError;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::{
    Difficulty, EnabledTasks, PipelineError, StudyApi, StudyRequest, StudyRun, SummaryStyle,
    TaskOptions,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest accepted upload.
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024 * 1024;

/// Build the HTTP router exposing the study API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: StudyApi + 'static,
{
    Router::new()
        .route(
            "/process",
            post(process_document::<S>).layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES)),
        )
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Query parameters accepted by `POST /process`.
///
/// Unset toggles fall back to the defaults: summaries on, quizzes and flashcards off.
#[derive(Debug, Default, Deserialize)]
struct ProcessQuery {
    #[serde(default)]
    summaries: Option<bool>,
    #[serde(default)]
    quizzes: Option<bool>,
    #[serde(default)]
    flashcards: Option<bool>,
    #[serde(default)]
    style: Option<SummaryStyle>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    quiz_count: Option<usize>,
    #[serde(default)]
    flashcard_count: Option<usize>,
}

impl ProcessQuery {
    fn into_request(self) -> StudyRequest {
        let tasks = EnabledTasks::default();
        let options = TaskOptions::default();
        StudyRequest {
            tasks: EnabledTasks {
                summaries: self.summaries.unwrap_or(tasks.summaries),
                quizzes: self.quizzes.unwrap_or(tasks.quizzes),
                flashcards: self.flashcards.unwrap_or(tasks.flashcards),
            },
            options: TaskOptions {
                style: self.style.unwrap_or(options.style),
                difficulty: self.difficulty.unwrap_or(options.difficulty),
                quiz_count: self.quiz_count.unwrap_or(options.quiz_count),
                flashcard_count: self.flashcard_count.unwrap_or(options.flashcard_count),
            },
        }
    }
}

/// Run the study pipeline over an uploaded PDF.
///
/// The body is the raw document. Sections are processed strictly in order with the configured
/// delay between them, so large documents keep the connection open for a while.
async fn process_document<S>(
    State(service): State<Arc<S>>,
    Query(query): Query<ProcessQuery>,
    body: Bytes,
) -> Result<Json<StudyRun>, AppError>
where
    S: StudyApi,
{
    if body.is_empty() {
        return Err(AppError(PipelineError::InvalidOptions(
            "request body must contain a PDF document".into(),
        )));
    }
    let request = query.into_request();
    let run = service.process_document(body.to_vec(), request).await?;
    tracing::info!(
        run_id = %run.run_id,
        sections = run.section_count,
        failures = run.failures.len(),
        "Process request completed"
    );
    Ok(Json(run))
}

/// Return the run counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: StudyApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_example: Option<&'static str>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "process",
                method: "POST",
                path: "/process",
                description: "Upload a PDF (raw body) and generate section summaries, multiple-choice questions, and flashcards. Response is the full study run with per-section failures.",
                query_example: Some(
                    "summaries=true&quizzes=true&flashcards=false&style=detailed&difficulty=hard&quiz_count=6&flashcard_count=8",
                ),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return document, section, and failure counters.",
                query_example: None,
            },
        ],
    })
}

struct AppError(PipelineError);

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PipelineError::Extraction(ExtractionError::Join(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::InvalidOptions(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Process request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "Process request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self(inner)
    }
}

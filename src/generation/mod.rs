//! Abstractions over the external generation service.
//!
//! Two seams live here. [`GenerationClient`] is the raw transport: a prompt goes in and the
//! provider's text comes back. [`StudyGenerator`] is the capability the pipeline depends on
//! (`summarize`, `generate_quiz`, `generate_flashcards`); the stock implementation,
//! [`LlmStudyGenerator`], builds grounded prompts and recovers structured payloads on top of any
//! `GenerationClient`. Tests substitute either layer with deterministic stubs.

pub mod gemini;
pub mod payload;
pub mod prompts;
mod study;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;
pub use payload::{CardItem, QuizItem};
pub use study::{LlmStudyGenerator, StudyGenerator};

/// Errors surfaced by the transport to the generation service.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider could not be reached or the endpoint does not exist.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate content: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by one generation task on one section.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport to the provider failed.
    #[error(transparent)]
    Client(#[from] GenerationClientError),
    /// Provider answered a summary request with no text.
    #[error("provider returned an empty summary")]
    EmptySummary,
    /// Structured payload could not be recovered from the provider text.
    #[error("could not recover structured payload: {0}")]
    MalformedPayload(String),
}

/// Shape of the response requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A JSON document.
    Json,
}

/// Request payload passed to the generation provider.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Optional system instruction sent ahead of the prompt.
    pub system: Option<String>,
    /// Prompt assembled by the study generator.
    pub prompt: String,
    /// Requested response shape.
    pub format: ResponseFormat,
}

/// Interface implemented by generation providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one prompt and return the provider's text response.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationClientError>;
}

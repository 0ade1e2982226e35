use super::payload::{CardItem, QuizItem, parse_flashcards, parse_quiz};
use super::prompts;
use super::{GenerationClient, GenerationError, GenerationRequest, ResponseFormat};
use crate::pipeline::{Difficulty, SummaryStyle};
use async_trait::async_trait;

/// Study material capabilities the pipeline depends on.
///
/// Each call sees exactly one section of text and nothing else.
#[async_trait]
pub trait StudyGenerator: Send + Sync {
    /// Summarize one section in the requested style.
    async fn summarize(
        &self,
        section_text: &str,
        style: SummaryStyle,
    ) -> Result<String, GenerationError>;

    /// Produce up to `count` multiple-choice questions for one section.
    async fn generate_quiz(
        &self,
        section_text: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<QuizItem>, GenerationError>;

    /// Produce up to `count` flashcards for one section.
    async fn generate_flashcards(
        &self,
        section_text: &str,
        count: usize,
    ) -> Result<Vec<CardItem>, GenerationError>;
}

/// [`StudyGenerator`] backed by a text generation provider.
pub struct LlmStudyGenerator {
    client: Box<dyn GenerationClient>,
}

impl LlmStudyGenerator {
    /// Wrap a provider client.
    pub fn new(client: Box<dyn GenerationClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StudyGenerator for LlmStudyGenerator {
    async fn summarize(
        &self,
        section_text: &str,
        style: SummaryStyle,
    ) -> Result<String, GenerationError> {
        let text = self
            .client
            .generate(GenerationRequest {
                system: None,
                prompt: prompts::summary_prompt(section_text, style),
                format: ResponseFormat::Text,
            })
            .await?;
        let summary = text.trim();
        if summary.is_empty() {
            return Err(GenerationError::EmptySummary);
        }
        Ok(summary.to_string())
    }

    async fn generate_quiz(
        &self,
        section_text: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<QuizItem>, GenerationError> {
        let raw = self
            .client
            .generate(GenerationRequest {
                system: Some(prompts::quiz_system()),
                prompt: prompts::quiz_prompt(section_text, count, difficulty),
                format: ResponseFormat::Json,
            })
            .await?;
        parse_quiz(&raw)
    }

    async fn generate_flashcards(
        &self,
        section_text: &str,
        count: usize,
    ) -> Result<Vec<CardItem>, GenerationError> {
        let raw = self
            .client
            .generate(GenerationRequest {
                system: Some(prompts::flashcard_system()),
                prompt: prompts::flashcard_prompt(section_text, count),
                format: ResponseFormat::Json,
            })
            .await?;
        parse_flashcards(&raw)
    }
}

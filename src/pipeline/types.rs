//! Core data types and error definitions for the study pipeline.

use crate::extract::ExtractionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Accepted range for questions and flashcards requested per section.
pub const ITEM_COUNT_RANGE: RangeInclusive<usize> = 4..=12;

/// Errors produced while validating chunking parameters.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Section size of zero can never make progress.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap would move the cursor backwards or keep it in place.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({max_chars})")]
    OverlapTooLarge {
        /// Requested overlap in characters.
        overlap: usize,
        /// Requested section size in characters.
        max_chars: usize,
    },
}

/// Errors emitted by the study pipeline before any section is dispatched.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Document could not be read or parsed.
    #[error("Failed to extract document text: {0}")]
    Extraction(#[from] ExtractionError),
    /// Run options were outside their accepted bounds.
    #[error("Invalid run options: {0}")]
    InvalidOptions(String),
}

/// One section of the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// 1-based section number.
    pub index: usize,
    /// Offset of the first character within the document text.
    pub start: usize,
    /// Section text.
    pub text: String,
}

impl Chunk {
    /// Section length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Summary tone requested from the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    /// Short bullet points.
    #[default]
    Concise,
    /// Longer bullet points with supporting detail.
    Detailed,
}

impl SummaryStyle {
    /// Lowercase label passed into prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }
}

/// Quiz difficulty requested from the generation service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Recall-level questions.
    Easy,
    /// Default difficulty.
    #[default]
    Medium,
    /// Questions that require combining facts from the section.
    Hard,
}

impl Difficulty {
    /// Lowercase label passed into prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// Generation task performed for each section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Section summary.
    Summary,
    /// Multiple-choice questions.
    Quiz,
    /// Question/answer cards.
    Flashcards,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Summary => "summary",
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
        };
        f.write_str(label)
    }
}

/// Which tasks run for every section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledTasks {
    /// Generate a summary per section.
    pub summaries: bool,
    /// Generate multiple-choice questions per section.
    pub quizzes: bool,
    /// Generate flashcards per section.
    pub flashcards: bool,
}

impl EnabledTasks {
    /// Every task enabled.
    pub const ALL: Self = Self {
        summaries: true,
        quizzes: true,
        flashcards: true,
    };

    /// Whether at least one task is enabled.
    pub fn any(&self) -> bool {
        self.summaries || self.quizzes || self.flashcards
    }

    /// Number of external calls made per section.
    pub fn count(&self) -> usize {
        [self.summaries, self.quizzes, self.flashcards]
            .into_iter()
            .filter(|enabled| *enabled)
            .count()
    }
}

impl Default for EnabledTasks {
    fn default() -> Self {
        Self {
            summaries: true,
            quizzes: false,
            flashcards: false,
        }
    }
}

/// Per-task tuning shared by every section of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    /// Summary tone.
    pub style: SummaryStyle,
    /// Quiz difficulty.
    pub difficulty: Difficulty,
    /// Questions requested per section.
    pub quiz_count: usize,
    /// Flashcards requested per section.
    pub flashcard_count: usize,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            style: SummaryStyle::Concise,
            difficulty: Difficulty::Medium,
            quiz_count: 6,
            flashcard_count: 8,
        }
    }
}

impl TaskOptions {
    /// Reject counts outside [`ITEM_COUNT_RANGE`].
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (label, value) in [
            ("quiz_count", self.quiz_count),
            ("flashcard_count", self.flashcard_count),
        ] {
            if !ITEM_COUNT_RANGE.contains(&value) {
                return Err(PipelineError::InvalidOptions(format!(
                    "{label} must be between {} and {}, got {value}",
                    ITEM_COUNT_RANGE.start(),
                    ITEM_COUNT_RANGE.end()
                )));
            }
        }
        Ok(())
    }
}

/// Everything a caller chooses for one document run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRequest {
    /// Tasks to run per section.
    pub tasks: EnabledTasks,
    /// Task tuning.
    pub options: TaskOptions,
}

/// Summary produced for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Originating section.
    pub section: usize,
    /// Summary body.
    pub text: String,
}

/// Multiple-choice question produced for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Originating section.
    pub section: usize,
    /// Question prompt.
    pub question: String,
    /// Exactly four answer options.
    pub options: [String; 4],
    /// Zero-based index of the correct option.
    pub answer_index: usize,
    /// Short explanation grounded in the section.
    pub explanation: String,
}

impl QuizQuestion {
    /// Letter (`A`-`D`) of the correct option.
    pub fn answer_letter(&self) -> char {
        option_letter(self.answer_index)
    }
}

/// Letter label for a zero-based option index.
pub fn option_letter(index: usize) -> char {
    char::from(b'A' + (index.min(25) as u8))
}

/// Question/answer card produced for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Originating section.
    pub section: usize,
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
}

/// Results accumulated across one run, each ordered by section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCollections {
    /// One summary per successfully summarized section.
    pub summaries: Vec<SectionSummary>,
    /// Zero or more questions per section.
    pub quizzes: Vec<QuizQuestion>,
    /// Zero or more cards per section.
    pub flashcards: Vec<Flashcard>,
}

/// A generation task that failed for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    /// Section the task ran on.
    pub section: usize,
    /// Task that failed.
    pub task: TaskKind,
    /// Rendered error.
    pub message: String,
}

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyRun {
    /// Unique identifier for this run.
    pub run_id: uuid::Uuid,
    /// RFC 3339 timestamp taken when the run finished.
    pub generated_at: String,
    /// SHA-256 of the source document, when the run started from a file.
    pub document_fingerprint: Option<String>,
    /// Pages seen by the extractor, when the run started from a file.
    pub page_count: Option<usize>,
    /// Characters of extracted text.
    pub char_count: usize,
    /// Number of sections dispatched.
    pub section_count: usize,
    /// Tasks and options the run used.
    pub request: StudyRequest,
    /// Generated material.
    pub results: ResultCollections,
    /// Per-section task failures.
    pub failures: Vec<SectionFailure>,
}

//! Study pipeline: chunking, per-section dispatch, and rate-limited sequencing.

pub mod chunking;
pub mod dispatch;
pub mod sequencer;
mod service;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use chunking::{ChunkingParams, Chunks, chunk_text};
pub use service::{StudyApi, StudyService};
pub use types::{
    Chunk, ChunkingError, Difficulty, EnabledTasks, Flashcard, ITEM_COUNT_RANGE, PipelineError,
    QuizQuestion, ResultCollections, SectionFailure, SectionSummary, StudyRequest, StudyRun,
    SummaryStyle, TaskKind, TaskOptions,
};

//! File exports for generated study material.
//!
//! Summaries are written as plain text; quizzes and flashcards as CSV so they can be imported
//! into spreadsheet or flashcard tools.

use crate::pipeline::{Flashcard, QuizQuestion, SectionSummary, StudyRun};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used for exported summaries.
pub const SUMMARIES_FILE: &str = "summaries.txt";
/// File name used for exported quiz questions.
pub const QUIZZES_FILE: &str = "quizzes.csv";
/// File name used for exported flashcards.
pub const FLASHCARDS_FILE: &str = "flashcards.csv";

/// Errors raised while writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem operation failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// CSV encoding failed.
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    /// Quiz options could not be encoded as JSON.
    #[error("Failed to encode quiz options: {0}")]
    Options(#[from] serde_json::Error),
}

/// Join summaries into `Section {i}\n{summary}` blocks separated by a blank line.
pub fn summaries_text(summaries: &[SectionSummary]) -> String {
    summaries
        .iter()
        .map(|summary| format!("Section {}\n{}", summary.section, summary.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write quiz questions as CSV with options encoded as a JSON array.
pub fn write_quizzes_csv<W: Write>(writer: W, questions: &[QuizQuestion]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["section", "question", "options", "answer_index", "explanation"])?;
    for question in questions {
        let options = serde_json::to_string(&question.options)?;
        csv.write_record([
            question.section.to_string().as_str(),
            question.question.as_str(),
            options.as_str(),
            question.answer_index.to_string().as_str(),
            question.explanation.as_str(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write flashcards as CSV.
pub fn write_flashcards_csv<W: Write>(writer: W, cards: &[Flashcard]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["section", "question", "answer"])?;
    for card in cards {
        csv.write_record([
            card.section.to_string().as_str(),
            card.question.as_str(),
            card.answer.as_str(),
        ])?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write export files for every task enabled in `run` into `dir`.
///
/// The directory is created when missing. Returns the written paths in the order summaries,
/// quizzes, flashcards.
pub fn write_exports(dir: impl AsRef<Path>, run: &StudyRun) -> Result<Vec<PathBuf>, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let tasks = run.request.tasks;
    let mut written = Vec::new();

    if tasks.summaries {
        let path = dir.join(SUMMARIES_FILE);
        fs::write(&path, summaries_text(&run.results.summaries)).map_err(|source| {
            ExportError::Io {
                path: path.clone(),
                source,
            }
        })?;
        written.push(path);
    }
    if tasks.quizzes {
        let path = dir.join(QUIZZES_FILE);
        write_quizzes_csv(create(&path)?, &run.results.quizzes)?;
        written.push(path);
    }
    if tasks.flashcards {
        let path = dir.join(FLASHCARDS_FILE);
        write_flashcards_csv(create(&path)?, &run.results.flashcards)?;
        written.push(path);
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "Exports written");
    Ok(written)
}

fn create(path: &Path) -> Result<fs::File, ExportError> {
    fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

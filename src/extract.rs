//! Text extraction from uploaded PDF documents.
//!
//! Extraction is delegated to `pdf-extract`, one string per page. Each page is trimmed, pages
//! are joined in order with `\n`, and every blank line is dropped. Pages without extractable
//! text contribute an empty string rather than an error. There is no OCR fallback.

use sha2::{Digest, Sha256};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Document could not be read from disk.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path we attempted to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Document bytes are not a parseable PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    /// Background extraction task failed to complete.
    #[error("extraction task failed: {0}")]
    Join(String),
}

/// Text pulled from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    /// Non-blank lines of every page, in page order, joined with `\n`.
    pub text: String,
    /// Number of pages reported by the extractor.
    pub page_count: usize,
    /// Hex-encoded SHA-256 of the source bytes.
    pub fingerprint: String,
}

impl DocumentText {
    /// Length of the extracted text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Read a document from disk and extract its text.
pub async fn extract_path(path: impl AsRef<Path>) -> Result<DocumentText, ExtractionError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read document");
    extract_bytes(bytes).await
}

/// Extract text from document bytes on the blocking pool.
pub async fn extract_bytes(bytes: Vec<u8>) -> Result<DocumentText, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_document(&bytes))
        .await
        .map_err(|error| ExtractionError::Join(error.to_string()))?
}

/// Extract text from document bytes on the current thread.
pub fn extract_document(bytes: &[u8]) -> Result<DocumentText, ExtractionError> {
    let raw_pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractionError::Parse("PDF parser aborted on malformed input".into()))?
    .map_err(|error| ExtractionError::Parse(error.to_string()))?;

    let pages = trim_pages(raw_pages);
    let text = join_pages(&pages);
    let document = DocumentText {
        page_count: pages.len(),
        fingerprint: fingerprint(bytes),
        text,
    };
    tracing::info!(
        pages = document.page_count,
        chars = document.char_count(),
        "Extracted document text"
    );
    Ok(document)
}

/// Trim every page the extractor returned, keeping empty pages in place.
pub fn trim_pages(pages: Vec<String>) -> Vec<String> {
    pages
        .into_iter()
        .map(|page| page.trim().to_string())
        .collect()
}

/// Join pages in order and drop every line that is blank after trimming.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .join("\n")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#![deny(missing_docs)]

//! Core library for Studypack, a PDF study assistant backed by Gemini.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Export of generated material to text and CSV files.
pub mod export;
/// PDF text extraction.
pub mod extract;
/// Generation client abstraction, Gemini adapter, and structured payload parsing.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Run metrics helpers.
pub mod metrics;
/// Chunking, dispatch, and sequencing of study tasks.
pub mod pipeline;
/// Plain-text presentation of study runs.
pub mod render;

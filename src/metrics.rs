use crate::pipeline::ResultCollections;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing study material generated since startup.
#[derive(Default)]
pub struct RunMetrics {
    documents_processed: AtomicU64,
    sections_processed: AtomicU64,
    summaries_generated: AtomicU64,
    questions_generated: AtomicU64,
    flashcards_generated: AtomicU64,
    generation_failures: AtomicU64,
}

impl RunMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished run into the counters.
    pub fn record_run(&self, sections: usize, results: &ResultCollections, failures: usize) {
        let add = |counter: &AtomicU64, value: usize| {
            counter.fetch_add(value as u64, Ordering::Relaxed);
        };
        add(&self.documents_processed, 1);
        add(&self.sections_processed, sections);
        add(&self.summaries_generated, results.summaries.len());
        add(&self.questions_generated, results.quizzes.len());
        add(&self.flashcards_generated, results.flashcards.len());
        add(&self.generation_failures, failures);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            documents_processed: load(&self.documents_processed),
            sections_processed: load(&self.sections_processed),
            summaries_generated: load(&self.summaries_generated),
            questions_generated: load(&self.questions_generated),
            flashcards_generated: load(&self.flashcards_generated),
            generation_failures: load(&self.generation_failures),
        }
    }
}

/// Immutable view of run counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents processed since startup.
    pub documents_processed: u64,
    /// Sections dispatched across all documents.
    pub sections_processed: u64,
    /// Section summaries produced.
    pub summaries_generated: u64,
    /// Multiple-choice questions produced.
    pub questions_generated: u64,
    /// Flashcards produced.
    pub flashcards_generated: u64,
    /// Generation tasks that failed and were reported per section.
    pub generation_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Flashcard, SectionSummary};

    #[test]
    fn accumulates_across_runs() {
        let metrics = RunMetrics::new();
        let results = ResultCollections {
            summaries: vec![SectionSummary {
                section: 1,
                text: "- point".into(),
            }],
            quizzes: Vec::new(),
            flashcards: vec![
                Flashcard {
                    section: 1,
                    question: "q".into(),
                    answer: "a".into(),
                };
                2
            ],
        };
        metrics.record_run(3, &results, 1);
        metrics.record_run(2, &ResultCollections::default(), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 2);
        assert_eq!(snapshot.sections_processed, 5);
        assert_eq!(snapshot.summaries_generated, 1);
        assert_eq!(snapshot.questions_generated, 0);
        assert_eq!(snapshot.flashcards_generated, 2);
        assert_eq!(snapshot.generation_failures, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        assert_eq!(RunMetrics::new().snapshot(), MetricsSnapshot::default());
    }
}

//! Strictly ordered, rate-limited walk over a document's sections.
//!
//! Section `i + 1` is dispatched only after every enabled task of section `i` has returned and
//! the fixed delay has elapsed. The delay applies after every section, including failed ones and
//! the last one. Failures are recorded against their section and the walk continues.

use super::dispatch::{Dispatcher, SectionOutcome};
use super::types::{Chunk, ResultCollections, SectionFailure};
use std::time::Duration;

/// Progress hooks invoked around each section.
pub trait SequencerObserver: Send + Sync {
    /// Called before a section is dispatched.
    fn section_started(&self, _section: usize, _total: usize) {}

    /// Called once a section's tasks have all returned, before the delay.
    fn section_finished(&self, _section: usize, _failed_tasks: usize) {}
}

/// Accumulated output of one sequenced run.
#[derive(Debug, Default)]
pub struct SequenceReport {
    /// Generated material in section order.
    pub results: ResultCollections,
    /// Failed tasks in section order.
    pub failures: Vec<SectionFailure>,
    /// Sections dispatched.
    pub sections: usize,
}

/// Drives a [`Dispatcher`] over sections one at a time.
pub struct Sequencer<'a> {
    dispatcher: Dispatcher<'a>,
    delay: Duration,
    observer: Option<&'a dyn SequencerObserver>,
}

impl<'a> Sequencer<'a> {
    /// Build a sequencer that pauses for `delay` after each section.
    pub fn new(dispatcher: Dispatcher<'a>, delay: Duration) -> Self {
        Self {
            dispatcher,
            delay,
            observer: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: &'a dyn SequencerObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Dispatch every section in order and collect the results.
    pub async fn run(&self, chunks: &[Chunk]) -> SequenceReport {
        let total = chunks.len();
        let mut report = SequenceReport::default();

        for chunk in chunks {
            if let Some(observer) = self.observer {
                observer.section_started(chunk.index, total);
            }

            let outcome = self.dispatcher.dispatch(chunk).await;
            let failed = absorb(outcome, &mut report);
            report.sections += 1;

            tracing::info!(section = chunk.index, total, failed, "Section processed");
            if let Some(observer) = self.observer {
                observer.section_finished(chunk.index, failed);
            }

            if !self.delay.is_zero() {
                tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Rate limit pause");
                tokio::time::sleep(self.delay).await;
            }
        }

        report
    }
}

/// Append a finished section to the report, returning how many of its tasks failed.
fn absorb(outcome: SectionOutcome, report: &mut SequenceReport) -> usize {
    let section = outcome.section;
    let failures: Vec<SectionFailure> = outcome
        .failures()
        .map(|(task, error)| {
            tracing::warn!(section, task = %task, error = %error, "Generation task failed");
            SectionFailure {
                section,
                task,
                message: error.to_string(),
            }
        })
        .collect();
    let failed = failures.len();
    report.failures.extend(failures);

    if let Some(Ok(summary)) = outcome.summary {
        report.results.summaries.push(summary);
    }
    if let Some(Ok(questions)) = outcome.quiz {
        report.results.quizzes.extend(questions);
    }
    if let Some(Ok(cards)) = outcome.flashcards {
        report.results.flashcards.extend(cards);
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::ScriptedGenerator;
    use crate::pipeline::types::{EnabledTasks, TaskKind, TaskOptions};
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(position, text)| Chunk {
                index: position + 1,
                start: 0,
                text: text.to_string(),
            })
            .collect()
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl SequencerObserver for RecordingObserver {
        fn section_started(&self, section: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {section}/{total}"));
        }

        fn section_finished(&self, section: usize, failed_tasks: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {section} failed={failed_tasks}"));
        }
    }

    #[tokio::test]
    async fn summaries_cover_every_section_in_order() {
        let generator = ScriptedGenerator::default();
        let dispatcher = Dispatcher::new(&generator, EnabledTasks::ALL, TaskOptions::default());
        let sequencer = Sequencer::new(dispatcher, Duration::ZERO);

        let report = sequencer.run(&chunks(&["one", "two", "three"])).await;

        assert_eq!(report.sections, 3);
        let sections: Vec<usize> = report.results.summaries.iter().map(|s| s.section).collect();
        assert_eq!(sections, vec![1, 2, 3]);
        let quiz_sections: Vec<usize> = report.results.quizzes.iter().map(|q| q.section).collect();
        assert_eq!(quiz_sections, vec![1, 1, 2, 2, 3, 3]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn failed_quiz_is_reported_and_run_continues() {
        let generator = ScriptedGenerator::failing_quiz_on("bad");
        let dispatcher = Dispatcher::new(&generator, EnabledTasks::ALL, TaskOptions::default());
        let sequencer = Sequencer::new(dispatcher, Duration::ZERO);

        let report = sequencer.run(&chunks(&["good", "bad", "fine"])).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].section, 2);
        assert_eq!(report.failures[0].task, TaskKind::Quiz);
        assert_eq!(report.results.summaries.len(), 3);
        assert_eq!(report.results.flashcards.len(), 3);
        let quiz_sections: Vec<usize> = report.results.quizzes.iter().map(|q| q.section).collect();
        assert_eq!(quiz_sections, vec![1, 1, 3, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_full_delay_after_every_section() {
        let generator = ScriptedGenerator::default();
        let dispatcher = Dispatcher::new(&generator, EnabledTasks::default(), TaskOptions::default());
        let sequencer = Sequencer::new(dispatcher, Duration::from_secs(5));

        let started = Instant::now();
        let report = sequencer.run(&chunks(&["a", "b", "c"])).await;

        assert_eq!(report.sections, 3);
        assert!(started.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test]
    async fn observer_sees_sections_in_order() {
        let generator = ScriptedGenerator::failing_quiz_on("second");
        let observer = RecordingObserver::default();
        let dispatcher = Dispatcher::new(&generator, EnabledTasks::ALL, TaskOptions::default());
        let sequencer = Sequencer::new(dispatcher, Duration::ZERO).with_observer(&observer);

        sequencer.run(&chunks(&["first", "second"])).await;

        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                "start 1/2".to_string(),
                "done 1 failed=0".to_string(),
                "start 2/2".to_string(),
                "done 2 failed=1".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn no_sections_means_no_calls() {
        let generator = ScriptedGenerator::default();
        let dispatcher = Dispatcher::new(&generator, EnabledTasks::ALL, TaskOptions::default());
        let report = Sequencer::new(dispatcher, Duration::from_secs(5)).run(&[]).await;

        assert_eq!(report.sections, 0);
        assert!(generator.calls().is_empty());
    }
}

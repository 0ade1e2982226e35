//! Per-section fan-out to the enabled generation tasks.

use super::types::{
    Chunk, EnabledTasks, Flashcard, QuizQuestion, SectionSummary, TaskKind, TaskOptions,
};
use crate::generation::{GenerationError, StudyGenerator};

/// Everything one section produced, one independent result per enabled task.
///
/// A task that was not enabled is `None`; a failing task never hides the results of the others.
#[derive(Debug)]
pub struct SectionOutcome {
    /// Section the outcome belongs to.
    pub section: usize,
    /// Summary task result.
    pub summary: Option<Result<SectionSummary, GenerationError>>,
    /// Quiz task result.
    pub quiz: Option<Result<Vec<QuizQuestion>, GenerationError>>,
    /// Flashcard task result.
    pub flashcards: Option<Result<Vec<Flashcard>, GenerationError>>,
}

impl SectionOutcome {
    /// Iterate the failed tasks of this section.
    pub fn failures(&self) -> impl Iterator<Item = (TaskKind, &GenerationError)> + '_ {
        let summary = self
            .summary
            .as_ref()
            .and_then(|result| result.as_ref().err())
            .map(|error| (TaskKind::Summary, error));
        let quiz = self
            .quiz
            .as_ref()
            .and_then(|result| result.as_ref().err())
            .map(|error| (TaskKind::Quiz, error));
        let flashcards = self
            .flashcards
            .as_ref()
            .and_then(|result| result.as_ref().err())
            .map(|error| (TaskKind::Flashcards, error));
        summary.into_iter().chain(quiz).chain(flashcards)
    }
}

/// Runs the enabled tasks for one section at a time.
pub struct Dispatcher<'a> {
    generator: &'a dyn StudyGenerator,
    tasks: EnabledTasks,
    options: TaskOptions,
}

impl<'a> Dispatcher<'a> {
    /// Bind a generator to the tasks and options of one run.
    pub fn new(generator: &'a dyn StudyGenerator, tasks: EnabledTasks, options: TaskOptions) -> Self {
        Self {
            generator,
            tasks,
            options,
        }
    }

    /// Run every enabled task for `chunk`, tagging results with its section index.
    ///
    /// Tasks run one after another: summary, quiz, flashcards.
    pub async fn dispatch(&self, chunk: &Chunk) -> SectionOutcome {
        let section = chunk.index;
        let options = self.options;

        let summary = if self.tasks.summaries {
            tracing::debug!(section, task = %TaskKind::Summary, "Dispatching");
            Some(
                self.generator
                    .summarize(&chunk.text, options.style)
                    .await
                    .map(|text| SectionSummary { section, text }),
            )
        } else {
            None
        };

        let quiz = if self.tasks.quizzes {
            tracing::debug!(section, task = %TaskKind::Quiz, "Dispatching");
            Some(
                self.generator
                    .generate_quiz(&chunk.text, options.quiz_count, options.difficulty)
                    .await
                    .map(|items| {
                        items
                            .into_iter()
                            .map(|item| QuizQuestion {
                                section,
                                question: item.question,
                                options: item.options,
                                answer_index: item.answer_index,
                                explanation: item.explanation,
                            })
                            .collect()
                    }),
            )
        } else {
            None
        };

        let flashcards = if self.tasks.flashcards {
            tracing::debug!(section, task = %TaskKind::Flashcards, "Dispatching");
            Some(
                self.generator
                    .generate_flashcards(&chunk.text, options.flashcard_count)
                    .await
                    .map(|cards| {
                        cards
                            .into_iter()
                            .map(|card| Flashcard {
                                section,
                                question: card.question,
                                answer: card.answer,
                            })
                            .collect()
                    }),
            )
        } else {
            None
        };

        SectionOutcome {
            section,
            summary,
            quiz,
            flashcards,
        }
    }
}

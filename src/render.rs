//! Plain-text rendering of a study run, grouped by section.
//!
//! A task that failed on a section is shown in that section's place, so a reader sees which
//! parts of the document have no material and why.

use crate::pipeline::{
    Flashcard, QuizQuestion, SectionFailure, SectionSummary, StudyRun, TaskKind,
    types::option_letter,
};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Render every enabled collection with its failures inline.
pub fn render_run(run: &StudyRun) -> String {
    let mut output = String::new();
    let tasks = run.request.tasks;

    if tasks.summaries {
        output.push_str(&render_summaries(&run.results.summaries, &run.failures));
        output.push('\n');
    }
    if tasks.quizzes {
        output.push_str(&render_quizzes(&run.results.quizzes, &run.failures));
        output.push('\n');
    }
    if tasks.flashcards {
        output.push_str(&render_flashcards(&run.results.flashcards, &run.failures));
        output.push('\n');
    }
    output
}

/// Render summaries under `### Section n` headers.
///
/// A section whose summary failed gets `(summary failed: ...)` under its header.
pub fn render_summaries(summaries: &[SectionSummary], failures: &[SectionFailure]) -> String {
    let mut output = String::from("## Section Summaries\n\n");
    let failed = failures_for(failures, TaskKind::Summary);
    if summaries.is_empty() && failed.is_empty() {
        output.push_str("No summaries generated.\n");
        return output;
    }
    for section in sections(summaries.iter().map(|summary| summary.section), &failed) {
        let _ = writeln!(output, "### Section {section}");
        for summary in summaries.iter().filter(|summary| summary.section == section) {
            let _ = writeln!(output, "{}", summary.text);
        }
        for failure in failed.iter().filter(|failure| failure.section == section) {
            let _ = writeln!(output, "(summary failed: {})", failure.message);
        }
        output.push('\n');
    }
    output
}

/// Render each question with lettered options, the answer, and its explanation.
///
/// Questions are numbered across the whole document. A section whose quiz failed gets one
/// `(Section n: quiz failed: ...)` line where its questions would be.
pub fn render_quizzes(questions: &[QuizQuestion], failures: &[SectionFailure]) -> String {
    let mut output = String::from("## Generated MCQs\n\n");
    let failed = failures_for(failures, TaskKind::Quiz);
    if questions.is_empty() && failed.is_empty() {
        output.push_str("No quiz questions generated.\n");
        return output;
    }
    let mut number = 0;
    for section in sections(questions.iter().map(|question| question.section), &failed) {
        for question in questions.iter().filter(|question| question.section == section) {
            number += 1;
            let _ = writeln!(
                output,
                "Q{number} (Section {}): {}",
                question.section, question.question
            );
            for (index, option) in question.options.iter().enumerate() {
                let _ = writeln!(output, "  {}. {}", option_letter(index), option);
            }
            let _ = writeln!(output, "  Answer: {}", question.answer_letter());
            if !question.explanation.is_empty() {
                let _ = writeln!(output, "  Explanation: {}", question.explanation);
            }
            output.push('\n');
        }
        push_failures(&mut output, &failed, section);
    }
    output
}

/// Render flashcards as question/answer pairs, with failed sections inline.
pub fn render_flashcards(cards: &[Flashcard], failures: &[SectionFailure]) -> String {
    let mut output = String::from("## Flashcards\n\n");
    let failed = failures_for(failures, TaskKind::Flashcards);
    if cards.is_empty() && failed.is_empty() {
        output.push_str("No flashcards generated.\n");
        return output;
    }
    for section in sections(cards.iter().map(|card| card.section), &failed) {
        for card in cards.iter().filter(|card| card.section == section) {
            let _ = writeln!(
                output,
                "Q (Section {}): {}\nA: {}\n",
                card.section, card.question, card.answer
            );
        }
        push_failures(&mut output, &failed, section);
    }
    output
}

fn failures_for(failures: &[SectionFailure], task: TaskKind) -> Vec<&SectionFailure> {
    failures
        .iter()
        .filter(|failure| failure.task == task)
        .collect()
}

fn sections(items: impl Iterator<Item = usize>, failed: &[&SectionFailure]) -> BTreeSet<usize> {
    items
        .chain(failed.iter().map(|failure| failure.section))
        .collect()
}

fn push_failures(output: &mut String, failed: &[&SectionFailure], section: usize) {
    for failure in failed.iter().filter(|failure| failure.section == section) {
        let _ = writeln!(
            output,
            "(Section {}: {} failed: {})\n",
            failure.section, failure.task, failure.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(section: usize) -> QuizQuestion {
        QuizQuestion {
            section,
            question: "Which gas do plants absorb?".into(),
            options: [
                "Oxygen".into(),
                "Carbon dioxide".into(),
                "Helium".into(),
                "Neon".into(),
            ],
            answer_index: 1,
            explanation: "The section says plants take in CO2.".into(),
        }
    }

    fn failure(section: usize, task: TaskKind) -> SectionFailure {
        SectionFailure {
            section,
            task,
            message: "could not recover structured payload".into(),
        }
    }

    #[test]
    fn summaries_are_grouped_by_section() {
        let rendered = render_summaries(
            &[
                SectionSummary {
                    section: 1,
                    text: "- first".into(),
                },
                SectionSummary {
                    section: 2,
                    text: "- second".into(),
                },
            ],
            &[],
        );
        let first = rendered.find("### Section 1\n- first").unwrap();
        let second = rendered.find("### Section 2\n- second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn failed_summary_appears_under_its_section() {
        let summaries = [
            SectionSummary {
                section: 1,
                text: "- first".into(),
            },
            SectionSummary {
                section: 3,
                text: "- third".into(),
            },
        ];
        let failures = [failure(2, TaskKind::Summary), failure(2, TaskKind::Quiz)];
        let rendered = render_summaries(&summaries, &failures);

        let first = rendered.find("### Section 1\n- first").unwrap();
        let second = rendered
            .find("### Section 2\n(summary failed: could not recover structured payload)")
            .unwrap();
        let third = rendered.find("### Section 3\n- third").unwrap();
        assert!(first < second && second < third);
        assert!(!rendered.contains("quiz failed"));
    }

    #[test]
    fn quiz_renders_letters_and_answer() {
        let rendered = render_quizzes(&[question(3)], &[]);
        assert!(rendered.contains("Q1 (Section 3): Which gas do plants absorb?"));
        assert!(rendered.contains("  B. Carbon dioxide"));
        assert!(rendered.contains("  Answer: B"));
        assert!(rendered.contains("Explanation: The section says plants take in CO2."));
    }

    #[test]
    fn failed_quiz_keeps_its_place_between_sections() {
        let rendered = render_quizzes(&[question(1), question(3)], &[failure(2, TaskKind::Quiz)]);

        let first = rendered.find("Q1 (Section 1)").unwrap();
        let failed = rendered
            .find("(Section 2: quiz failed: could not recover structured payload)")
            .unwrap();
        let third = rendered.find("Q2 (Section 3)").unwrap();
        assert!(first < failed && failed < third);
    }

    #[test]
    fn flashcards_show_failure_when_nothing_was_generated() {
        let rendered = render_flashcards(&[], &[failure(1, TaskKind::Flashcards)]);
        assert!(rendered.contains(
            "(Section 1: flashcards failed: could not recover structured payload)"
        ));
        assert!(!rendered.contains("No flashcards generated."));
    }

    #[test]
    fn empty_collections_render_notice() {
        assert!(render_flashcards(&[], &[]).contains("No flashcards generated."));
        assert!(render_quizzes(&[], &[]).contains("No quiz questions generated."));
        assert!(render_summaries(&[], &[]).contains("No summaries generated."));
    }
}

//! Prompt templates for the study tasks.
//!
//! Every prompt fences the section text in triple quotes and tells the model to rely on that
//! text alone. The grounding sentence is shared so all three tasks carry it verbatim.

use crate::pipeline::{Difficulty, SummaryStyle};

/// Instruction forbidding knowledge from outside the supplied section.
pub const GROUNDING_RULE: &str = "Use only facts from the provided text. Do not use outside knowledge. If information is missing, say \"Not in document\".";

/// Build the summary prompt for one section.
pub fn summary_prompt(section_text: &str, style: SummaryStyle) -> String {
    format!(
        "You are a helpful study assistant.\n\
         Summarize the section below in {style} bullet points.\n\
         {GROUNDING_RULE}\n\
         Section:\n\
         \"\"\"{section_text}\"\"\"",
        style = style.as_str(),
    )
}

/// System instruction fixing the quiz schema.
pub fn quiz_system() -> String {
    format!(
        "Create multiple choice questions from the provided content only. {GROUNDING_RULE} \
         Return valid JSON with this schema: \
         {{\"questions\":[{{\"question\":\"...\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\
         \"answer_index\":0,\"explanation\":\"...\"}}]}}"
    )
}

/// Build the quiz prompt for one section.
pub fn quiz_prompt(section_text: &str, count: usize, difficulty: Difficulty) -> String {
    format!(
        "Content:\n\
         \"\"\"{section_text}\"\"\"\n\
         Rules:\n\
         - Make {count} multiple choice questions\n\
         - Difficulty: {difficulty}\n\
         - No outside knowledge\n\
         - Each question must have exactly 4 options and one correct answer_index (0-3)\n\
         - Keep explanations short and grounded in the content\n\
         Return JSON only.",
        difficulty = difficulty.as_str(),
    )
}

/// System instruction fixing the flashcard schema.
pub fn flashcard_system() -> String {
    format!(
        "Extract key concepts as Q&A flashcards based only on the content. {GROUNDING_RULE} \
         Return JSON as {{\"cards\":[{{\"q\":\"...\",\"a\":\"...\"}}]}}"
    )
}

/// Build the flashcard prompt for one section.
pub fn flashcard_prompt(section_text: &str, count: usize) -> String {
    format!(
        "Content:\n\
         \"\"\"{section_text}\"\"\"\n\
         Rules:\n\
         - Create {count} concise Q&A pairs\n\
         - Focus on definitions, formulas, lists, contrasts\n\
         - Use simple language\n\
         - No outside knowledge\n\
         Return JSON only."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = "Photosynthesis converts light into chemical energy.";

    #[test]
    fn summary_prompt_embeds_section_and_grounding() {
        let prompt = summary_prompt(SECTION, SummaryStyle::Detailed);
        assert!(prompt.contains(SECTION));
        assert!(prompt.contains(GROUNDING_RULE));
        assert!(prompt.contains("detailed bullet points"));
    }

    #[test]
    fn quiz_prompt_carries_count_and_difficulty() {
        let prompt = quiz_prompt(SECTION, 7, Difficulty::Hard);
        assert!(prompt.contains(SECTION));
        assert!(prompt.contains("Make 7 multiple choice questions"));
        assert!(prompt.contains("Difficulty: hard"));
        assert!(prompt.contains("No outside knowledge"));
    }

    #[test]
    fn system_prompts_describe_schema() {
        let quiz = quiz_system();
        assert!(quiz.contains(r#""answer_index":0"#));
        assert!(quiz.contains(GROUNDING_RULE));
        let cards = flashcard_system();
        assert!(cards.contains(r#"{"cards":[{"q":"...","a":"..."}]}"#));
    }

    #[test]
    fn flashcard_prompt_carries_count() {
        let prompt = flashcard_prompt(SECTION, 9);
        assert!(prompt.contains("Create 9 concise Q&A pairs"));
        assert!(prompt.contains(SECTION));
    }
}

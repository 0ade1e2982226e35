//! Best-effort recovery of structured payloads from provider text.
//!
//! Providers asked for JSON still occasionally wrap it in prose or code fences. Parsing is
//! attempted strictly first; on failure the text between the first `{` and the last `}` is
//! parsed instead. Individual quiz items that break the schema (wrong option count,
//! out-of-range answer) are dropped with a warning; the rest of the payload survives.

use super::GenerationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options every quiz question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A validated multiple-choice question not yet tied to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Question prompt.
    pub question: String,
    /// Exactly four answer options.
    pub options: [String; OPTIONS_PER_QUESTION],
    /// Zero-based index of the correct option.
    pub answer_index: usize,
    /// Short grounded explanation.
    pub explanation: String,
}

/// A question/answer card not yet tied to a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardItem {
    /// Front of the card.
    pub question: String,
    /// Back of the card.
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct QuizEnvelope {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CardEnvelope {
    #[serde(default)]
    cards: Vec<Value>,
}

/// Card as the model wrote it. `q`/`a` win over the long names when both are present.
#[derive(Debug, Deserialize)]
struct RawCard {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    a: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
}

impl RawCard {
    fn into_card(self) -> Result<CardItem, &'static str> {
        let question = self
            .q
            .filter(|text| !text.trim().is_empty())
            .or(self.question)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or("missing question")?;
        let answer = self.a.or(self.answer).ok_or("missing answer")?;
        Ok(CardItem {
            question,
            answer: answer.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    options: Vec<String>,
    answer_index: Value,
    #[serde(default)]
    explanation: String,
}

/// Parse `raw` as `T`, falling back to the outermost `{ ... }` span.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    let trimmed = raw.trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(strict_error) => {
            let Some(candidate) = outermost_object(trimmed) else {
                return Err(GenerationError::MalformedPayload(format!(
                    "no JSON object found ({strict_error})"
                )));
            };
            tracing::debug!(error = %strict_error, "Strict JSON parse failed; retrying on object span");
            serde_json::from_str(candidate)
                .map_err(|error| GenerationError::MalformedPayload(error.to_string()))
        }
    }
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Recover the `questions` list from a quiz response.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizItem>, GenerationError> {
    let envelope: QuizEnvelope = parse_structured(raw)?;
    let total = envelope.questions.len();
    let items: Vec<QuizItem> = envelope
        .questions
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| match validate_question(value) {
            Ok(item) => Some(item),
            Err(reason) => {
                tracing::warn!(position, reason = %reason, "Dropping malformed quiz question");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::debug!(kept = items.len(), total, "Quiz payload partially recovered");
    }
    Ok(items)
}

/// Recover the `cards` list from a flashcard response.
pub fn parse_flashcards(raw: &str) -> Result<Vec<CardItem>, GenerationError> {
    let envelope: CardEnvelope = parse_structured(raw)?;
    Ok(envelope
        .cards
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            let card = serde_json::from_value::<RawCard>(value)
                .map_err(|error| error.to_string())
                .and_then(|raw| raw.into_card().map_err(str::to_string));
            match card {
                Ok(card) => Some(card),
                Err(error) => {
                    tracing::warn!(position, error = %error, "Dropping malformed flashcard");
                    None
                }
            }
        })
        .collect())
}

fn validate_question(value: Value) -> Result<QuizItem, String> {
    let raw: RawQuestion = serde_json::from_value(value).map_err(|error| error.to_string())?;
    if raw.question.trim().is_empty() {
        return Err("empty question".into());
    }
    let option_count = raw.options.len();
    let options: [String; OPTIONS_PER_QUESTION] = raw
        .options
        .try_into()
        .map_err(|_| format!("expected {OPTIONS_PER_QUESTION} options, got {option_count}"))?;
    let answer_index = answer_index(&raw.answer_index)
        .filter(|index| *index < OPTIONS_PER_QUESTION)
        .ok_or_else(|| format!("answer_index out of range: {}", raw.answer_index))?;

    Ok(QuizItem {
        question: raw.question.trim().to_string(),
        options,
        answer_index,
        explanation: raw.explanation.trim().to_string(),
    })
}

fn answer_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().map(|index| index as usize),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

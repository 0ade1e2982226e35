//! Deterministic generator shared by pipeline unit tests.

use crate::generation::{CardItem, GenerationError, QuizItem, StudyGenerator};
use crate::pipeline::{Difficulty, SummaryStyle};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct ScriptedGenerator {
    calls: Mutex<Vec<String>>,
    failing_quiz_marker: Option<String>,
}

impl ScriptedGenerator {
    pub(crate) fn failing_quiz_on(marker: &str) -> Self {
        Self {
            calls: Mutex::default(),
            failing_quiz_marker: Some(marker.to_string()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StudyGenerator for ScriptedGenerator {
    async fn summarize(
        &self,
        section_text: &str,
        _style: SummaryStyle,
    ) -> Result<String, GenerationError> {
        self.record(format!("summarize:{section_text}"));
        Ok(format!("summary of {section_text}"))
    }

    async fn generate_quiz(
        &self,
        section_text: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<Vec<QuizItem>, GenerationError> {
        self.record(format!("quiz:{section_text}:{count}:{}", difficulty.as_str()));
        if let Some(marker) = self.failing_quiz_marker.as_deref() {
            if section_text.contains(marker) {
                return Err(GenerationError::MalformedPayload(
                    "expected value at line 1 column 1".into(),
                ));
            }
        }
        Ok((1..=2)
            .map(|n| QuizItem {
                question: format!("Question {n} about {section_text}?"),
                options: ["w".into(), "x".into(), "y".into(), "z".into()],
                answer_index: n,
                explanation: format!("Stated in {section_text}."),
            })
            .collect())
    }

    async fn generate_flashcards(
        &self,
        section_text: &str,
        count: usize,
    ) -> Result<Vec<CardItem>, GenerationError> {
        self.record(format!("flashcards:{section_text}:{count}"));
        Ok(vec![CardItem {
            question: format!("Key idea of {section_text}?"),
            answer: section_text.to_string(),
        }])
    }
}

/// Build a minimal PDF with one line of Helvetica text per page.
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
            (0..page_count)
                .map(|position| format!("{} 0 R", 4 + position * 2))
                .collect::<Vec<_>>()
                .join(" ")
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (position, text) in pages.iter().enumerate() {
        let content_id = 5 + position * 2;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {content_id} 0 R >>"
        ));
        let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (position, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", position + 1));
    }
    let xref_offset = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.into_bytes()
}

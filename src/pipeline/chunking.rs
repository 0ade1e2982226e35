//! Fixed-size character windows over extracted document text.
//!
//! Sections are purely positional: a cursor starts at zero, each section spans at most
//! `max_chars` characters, and the cursor then moves back `overlap` characters from the end of
//! the section it just emitted. Splitting never looks at words or sentences, but it does count
//! Unicode scalar values rather than bytes, so a section never cuts a code point in half.
//!
//! The final section is the one that reaches the end of the text. With a non-zero overlap the
//! cursor would otherwise step back into text that has already been covered and emit the same
//! tail forever.

use super::types::{Chunk, ChunkingError};
use serde::Serialize;

/// Section size and overlap, validated so the cursor always moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkingParams {
    max_chars: usize,
    overlap: usize,
}

impl ChunkingParams {
    /// Validate a section size and overlap.
    ///
    /// `max_chars` must be positive and `overlap` strictly smaller than it.
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self, ChunkingError> {
        if max_chars == 0 {
            return Err(ChunkingError::InvalidChunkSize);
        }
        if overlap >= max_chars {
            return Err(ChunkingError::OverlapTooLarge { overlap, max_chars });
        }
        Ok(Self { max_chars, overlap })
    }

    /// Maximum characters per section.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Characters shared by consecutive sections.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance in characters between the starts of consecutive sections.
    pub fn stride(&self) -> usize {
        self.max_chars - self.overlap
    }

    /// Iterate the sections of `text` in order.
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            params: *self,
            cursor_byte: 0,
            cursor_char: 0,
            next_index: 1,
            finished: text.is_empty(),
        }
    }

    /// Number of sections `chunks` yields for a text of `char_len` characters.
    pub fn expected_count(&self, char_len: usize) -> usize {
        if char_len == 0 {
            return 0;
        }
        let beyond_first = char_len.saturating_sub(self.max_chars);
        1 + beyond_first.div_ceil(self.stride())
    }
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            max_chars: crate::config::DEFAULT_CHUNK_SIZE,
            overlap: crate::config::DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// Lazy, restartable iterator over the sections of a text.
///
/// Clone before consuming, or call [`ChunkingParams::chunks`] again, to walk the same
/// boundaries a second time.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    params: ChunkingParams,
    cursor_byte: usize,
    cursor_char: usize,
    next_index: usize,
    finished: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cursor_byte >= self.text.len() {
            return None;
        }

        let start_byte = self.cursor_byte;
        let end_byte = advance_chars(self.text, start_byte, self.params.max_chars);
        let chunk = Chunk {
            index: self.next_index,
            start: self.cursor_char,
            text: self.text[start_byte..end_byte].to_string(),
        };
        self.next_index += 1;

        if end_byte >= self.text.len() {
            self.finished = true;
        } else {
            self.cursor_byte = retreat_chars(self.text, end_byte, self.params.overlap);
            self.cursor_char += self.params.stride();
        }

        Some(chunk)
    }
}

/// Split `text` into sections, collecting them eagerly.
pub fn chunk_text(text: &str, params: ChunkingParams) -> Vec<Chunk> {
    params.chunks(text).collect()
}

fn advance_chars(text: &str, start: usize, count: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(count)
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

fn retreat_chars(text: &str, end: usize, count: usize) -> usize {
    if count == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(offset, _)| offset)
        .unwrap_or(0)
}

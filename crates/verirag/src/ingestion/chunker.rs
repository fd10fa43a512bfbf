//! Recursive text chunking with page tracking
//!
//! Chunks are exact character spans of the (trimmed) page text. A chunk is cut at
//! the last paragraph break inside its window, falling back to line breaks, then
//! sentence boundaries, then word starts, and finally a hard cut. The next chunk
//! begins at the first word start inside the overlap region so that neighbours
//! share up to `overlap` characters of context. Chunks never cross pages.
//!
//! Windows holding only whitespace are not emitted, so the middle of a whitespace
//! run longer than the window is dropped. Every other character of the page ends
//! up in some chunk.

use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, PageText};

/// Text chunker with configurable size and overlap (both in characters)
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size
    chunk_size: usize,
    /// Maximum overlap between neighbouring chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; `overlap` must be smaller than `chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::configuration("chunk size must be greater than 0"));
        }
        if overlap >= chunk_size {
            return Err(Error::configuration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Create from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk every page of a document, numbering chunks across pages
    pub fn chunk_pages(&self, document_id: Uuid, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            let text = page.text.trim();
            if text.is_empty() {
                continue;
            }

            for span in self.split_spans(text) {
                chunks.push(Chunk {
                    document_id,
                    page_number: page.page_number,
                    chunk_index: chunks.len() as u32,
                    char_start: span.start,
                    char_end: span.end,
                    content: span.content,
                });
            }
        }

        chunks
    }

    /// Split a single text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_spans(text)
            .into_iter()
            .map(|span| span.content)
            .collect()
    }

    fn split_spans(&self, text: &str) -> Vec<Span> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut spans = Vec::new();

        if len == 0 {
            return spans;
        }

        let boundaries = Boundaries::scan(text, &chars);
        let mut start = 0usize;

        loop {
            if len - start <= self.chunk_size {
                push_span(&mut spans, &chars, start, len);
                break;
            }

            let end = boundaries
                .break_point(start + self.overlap, start + self.chunk_size)
                .unwrap_or(start + self.chunk_size);
            push_span(&mut spans, &chars, start, end);

            start = if self.overlap == 0 {
                end
            } else {
                boundaries
                    .first_word_start(end - self.overlap, end)
                    .unwrap_or(end - self.overlap)
            };
        }

        spans
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug)]
struct Span {
    start: usize,
    end: usize,
    content: String,
}

fn push_span(spans: &mut Vec<Span>, chars: &[char], start: usize, end: usize) {
    let slice = &chars[start..end];
    // Whitespace runs longer than the window can yield nothing but whitespace
    if slice.iter().all(|c| c.is_whitespace()) {
        return;
    }
    spans.push(Span {
        start,
        end,
        content: slice.iter().collect(),
    });
}

/// Candidate break positions (character index *after* the separator), by priority
struct Boundaries {
    paragraphs: Vec<usize>,
    lines: Vec<usize>,
    sentences: Vec<usize>,
    words: Vec<usize>,
}

impl Boundaries {
    fn scan(text: &str, chars: &[char]) -> Self {
        let mut paragraphs = Vec::new();
        let mut lines = Vec::new();
        let mut words = Vec::new();

        for pos in 1..chars.len() {
            let prev = chars[pos - 1];
            if prev == '\n' {
                lines.push(pos);
                if pos >= 2 && chars[pos - 2] == '\n' {
                    paragraphs.push(pos);
                }
            }
            if prev.is_whitespace() && !chars[pos].is_whitespace() {
                words.push(pos);
            }
        }

        // Sentence bounds come back as byte offsets; map them to char positions
        let mut sentence_bytes = text
            .split_sentence_bound_indices()
            .map(|(offset, _)| offset)
            .filter(|&offset| offset > 0)
            .peekable();
        let mut sentences = Vec::new();
        for (char_pos, (byte_pos, _)) in text.char_indices().enumerate() {
            match sentence_bytes.peek() {
                Some(&offset) if offset == byte_pos => {
                    sentences.push(char_pos);
                    sentence_bytes.next();
                }
                Some(_) => {}
                None => break,
            }
        }

        Self {
            paragraphs,
            lines,
            sentences,
            words,
        }
    }

    /// Last boundary in `(lo, hi]`, preferring coarser separators
    fn break_point(&self, lo: usize, hi: usize) -> Option<usize> {
        [&self.paragraphs, &self.lines, &self.sentences, &self.words]
            .into_iter()
            .find_map(|candidates| {
                let idx = candidates.partition_point(|&pos| pos <= hi);
                match idx.checked_sub(1).map(|i| candidates[i]) {
                    Some(pos) if pos > lo => Some(pos),
                    _ => None,
                }
            })
    }

    /// First word start in `[lo, hi)`
    fn first_word_start(&self, lo: usize, hi: usize) -> Option<usize> {
        let idx = self.words.partition_point(|&pos| pos < lo);
        self.words.get(idx).copied().filter(|&pos| pos < hi)
    }
}

//! Chunk type definitions.

use serde::{Deserialize, Serialize};

/// Chapter-level metadata attached to every chunk of a chapter.
///
/// All fields are opaque pass-through strings; the chunking engine never
/// inspects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterMeta {
    /// Display name of the book
    pub book: String,

    /// Short key of the book (also the name of its chapters directory)
    pub book_key: String,

    /// Subject tag (e.g. "number-theory")
    pub subject: String,

    /// Level tag (e.g. "intro", "advanced")
    pub level: String,

    /// Part of the book the chapter belongs to, possibly empty
    pub part: String,

    /// Chapter title
    pub chapter: String,

    /// Markdown file the chapter was read from
    pub source_file: String,
}

/// A chunk of chapter text, the unit written to the output dataset.
///
/// Serializes as one flat JSON record: the chapter metadata fields followed
/// by `section`, `text`, `tokens_est` and `chunk_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Metadata of the owning chapter
    #[serde(flatten)]
    pub meta: ChapterMeta,

    /// Header of the owning section, empty for the chapter preamble
    pub section: String,

    /// The chunk text
    pub text: String,

    /// Estimated token count of `text`
    pub tokens_est: usize,

    /// Zero-based position in the final output, assigned after merging
    pub chunk_id: usize,
}

impl Chunk {
    /// Create an unnumbered chunk with a precomputed token estimate.
    pub fn new(meta: ChapterMeta, section: impl Into<String>, text: String, tokens_est: usize) -> Self {
        Self {
            meta,
            section: section.into(),
            text,
            tokens_est,
            chunk_id: 0,
        }
    }

    /// Get the length of the chunk text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

//! End-to-end chunking of one markdown chapter.

use tracing::debug;

use super::assembler::ChunkAssembler;
use super::base::TokenEstimator;
use super::merger::{assign_ids, drop_fragments, merge_small_chunks};
use super::preclean::{preclean, strip_title};
use super::sections::parse_sections;
use crate::types::{ChapterMeta, Chunk, ChunkingConfig};
use crate::MIN_CHUNK_TOKENS;

/// Structure-aware chapter chunker.
///
/// Runs preclean, title stripping, section parsing, block segmentation,
/// greedy assembly, small-chunk merging and the fragment floor, then numbers
/// the surviving chunks from zero. Holds no mutable state, so one instance
/// can serve any number of chapters concurrently.
#[derive(Debug, Clone, Copy)]
pub struct ChapterChunker {
    config: ChunkingConfig,
    estimator: TokenEstimator,
}

impl ChapterChunker {
    /// Create a chunker for the given budgets.
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config,
            estimator: TokenEstimator::new(config.chars_per_token),
        }
    }

    /// The budgets in use.
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk a chapter's markdown, tagging every chunk with `meta`.
    pub fn chunk_chapter(&self, markdown: &str, meta: &ChapterMeta) -> Vec<Chunk> {
        let cleaned = preclean(markdown);
        let body = strip_title(&cleaned);

        let sections = parse_sections(body);
        let raw = ChunkAssembler::new(meta, self.estimator, self.config.max_tokens).assemble(&sections);
        let raw_count = raw.len();

        let merged = merge_small_chunks(raw, &self.config, &self.estimator);
        let mut chunks = drop_fragments(merged, MIN_CHUNK_TOKENS);
        assign_ids(&mut chunks);

        debug!(
            chapter = %meta.chapter,
            sections = sections.len(),
            raw_chunks = raw_count,
            chunks = chunks.len(),
            "Chunked chapter"
        );

        chunks
    }
}

impl Default for ChapterChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

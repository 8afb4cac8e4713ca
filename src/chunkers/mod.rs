//! The chunking engine: from chapter markdown to sized chunks.

mod assembler;
mod base;
mod blocks;
mod chapter_chunker;
mod merger;
mod paragraphs;
mod preclean;
mod sections;

pub use assembler::ChunkAssembler;
pub use base::{estimate_tokens, TokenCounter, TokenEstimator};
pub use blocks::{split_into_blocks, Block, BlockKind, EnvironmentKind};
pub use chapter_chunker::ChapterChunker;
pub use merger::{assign_ids, drop_fragments, merge_small_chunks};
pub use paragraphs::split_at_paragraphs;
pub use preclean::{preclean, strip_title};
pub use sections::{parse_sections, Section};

//! Chapter Chunker Library
//!
//! Structure-aware chunking of textbook markdown chapters for retrieval and
//! training datasets. Chapters are split by section headers, segmented into
//! prose, theorem-like environments and proofs, packed into chunks under a
//! token budget and finally merged to repair over-fragmentation.

pub mod api;
pub mod batch;
pub mod catalog;
pub mod chunkers;
pub mod error;
pub mod output;
pub mod types;

pub use batch::{BatchConfig, BatchProcessor, BatchResult, TokenStats};
pub use catalog::{BookCatalog, BookInfo};
pub use chunkers::{estimate_tokens, ChapterChunker, TokenCounter, TokenEstimator};
pub use error::{ChunkerError, Result};
pub use types::{ChapterMeta, Chunk, ChunkingConfig, ServiceConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::batch::*;
    pub use crate::catalog::*;
    pub use crate::chunkers::*;
    pub use crate::types::*;
}

/// Default merge-trigger floor in estimated tokens
pub const DEFAULT_MIN_TOKENS: usize = 512;

/// Default hard packing ceiling in estimated tokens
pub const DEFAULT_MAX_TOKENS: usize = 1536;

/// Default characters-per-token ratio used by the estimator
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 3.5;

/// Chunks estimated below this many tokens are dropped after merging
pub const MIN_CHUNK_TOKENS: usize = 20;

//! Core types for the chunking tool.

mod chunk;
mod config;

pub use chunk::{ChapterMeta, Chunk};
pub use config::{ChunkingConfig, ServiceConfig, DEFAULT_CONFIG_FILE};

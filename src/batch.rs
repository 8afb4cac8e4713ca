//! Batch processing of whole books.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog::BookCatalog;
use crate::chunkers::{assign_ids, ChapterChunker};
use crate::error::ChunkerError;
use crate::output::write_jsonl;
use crate::types::Chunk;

/// Configuration for batch processing.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum chapters chunked concurrently
    pub concurrency: usize,
    /// Whether to continue when a chapter cannot be read
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            continue_on_error: true,
        }
    }
}

/// Result of processing one book.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub book_key: String,
    pub total_chapters: usize,
    pub processed_chapters: usize,
    pub failed_chapters: usize,
    pub total_chunks: usize,
    pub errors: Vec<BatchError>,
    pub stats: Option<TokenStats>,
}

/// Error while processing one chapter.
#[derive(Debug, Clone)]
pub struct BatchError {
    pub chapter: String,
    pub error: String,
}

/// Token estimate distribution over a set of chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStats {
    pub min: usize,
    pub median: usize,
    pub max: usize,
    pub total: usize,
}

impl TokenStats {
    /// Compute stats, or `None` for an empty set. The median is the upper
    /// middle element for even counts.
    pub fn from_chunks(chunks: &[Chunk]) -> Option<Self> {
        let mut tokens: Vec<usize> = chunks.iter().map(|c| c.tokens_est).collect();
        tokens.sort_unstable();
        Some(Self {
            min: *tokens.first()?,
            median: tokens[tokens.len() / 2],
            max: *tokens.last()?,
            total: tokens.iter().sum(),
        })
    }
}

/// Batch processor chunking every chapter of a book.
pub struct BatchProcessor {
    chunker: ChapterChunker,
    catalog: Arc<BookCatalog>,
    chapters_dir: PathBuf,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor reading books under `chapters_dir`.
    pub fn new(
        chunker: ChapterChunker,
        catalog: Arc<BookCatalog>,
        chapters_dir: impl Into<PathBuf>,
        config: BatchConfig,
    ) -> Self {
        Self {
            chunker,
            catalog,
            chapters_dir: chapters_dir.into(),
            config,
        }
    }

    /// Chunk all chapters of a book, in file name order.
    ///
    /// Chunk ids restart at zero for every chapter. A missing book directory
    /// is logged and yields no chunks.
    pub async fn process_book(&self, book_key: &str) -> Result<(Vec<Chunk>, BatchResult)> {
        let mut result = BatchResult {
            book_key: book_key.to_string(),
            ..Default::default()
        };

        let book_dir = self.chapters_dir.join(book_key);
        let chapters = match list_chapters(&book_dir) {
            Ok(chapters) => chapters,
            Err(ChunkerError::MissingBookDir(dir)) => {
                warn!(book = book_key, dir = %dir.display(), "Book directory not found, skipping");
                return Ok((Vec::new(), result));
            }
            Err(e) => return Err(e.into()),
        };

        result.total_chapters = chapters.len();
        info!(book = book_key, chapters = chapters.len(), "Starting book");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, path) in chapters.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let catalog = Arc::clone(&self.catalog);
            let chunker = self.chunker;
            let book_key = book_key.to_string();

            tasks.spawn(async move {
                let filename = file_name(&path);
                let outcome = async {
                    let _permit = semaphore.acquire_owned().await?;
                    let markdown = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("reading {}", path.display()))?;
                    let chunks = tokio::task::spawn_blocking({
                        let filename = filename.clone();
                        move || {
                            let meta = catalog.resolve_chapter_meta(&book_key, &filename, &markdown);
                            chunker.chunk_chapter(&markdown, &meta)
                        }
                    })
                    .await?;
                    anyhow::Ok(chunks)
                }
                .await;
                (index, filename, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(result.total_chapters);
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined.context("chapter task panicked")?);
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut all_chunks = Vec::new();
        for (_, chapter, outcome) in outcomes {
            match outcome {
                Ok(chunks) => {
                    debug!(book = book_key, chapter = %chapter, chunks = chunks.len(), "Chapter chunked");
                    all_chunks.extend(chunks);
                    result.processed_chapters += 1;
                }
                Err(e) => {
                    if !self.config.continue_on_error {
                        return Err(e.context(format!("chapter {} of {}", chapter, book_key)));
                    }
                    warn!(book = book_key, chapter = %chapter, error = %e, "Failed to process chapter");
                    result.errors.push(BatchError {
                        chapter,
                        error: format!("{:#}", e),
                    });
                    result.failed_chapters += 1;
                }
            }
        }

        result.total_chunks = all_chunks.len();
        result.stats = TokenStats::from_chunks(&all_chunks);

        info!(
            book = book_key,
            processed = result.processed_chapters,
            failed = result.failed_chapters,
            chunks = result.total_chunks,
            "Book processing complete"
        );

        Ok((all_chunks, result))
    }

    /// Chunk a book and write `<output_dir>/<book_key>.jsonl`.
    ///
    /// Chunk ids are renumbered so they run sequentially across the file.
    pub async fn write_book(&self, book_key: &str, output_dir: &Path) -> Result<BatchResult> {
        let (mut chunks, result) = self.process_book(book_key).await?;
        assign_ids(&mut chunks);

        let out_file = output_dir.join(format!("{}.jsonl", book_key));
        write_jsonl(&out_file, &chunks)?;

        match result.stats {
            Some(stats) => info!(
                book = book_key,
                chunks = chunks.len(),
                file = %out_file.display(),
                min = stats.min,
                median = stats.median,
                max = stats.max,
                total = stats.total,
                "Wrote book chunks"
            ),
            None => info!(book = book_key, file = %out_file.display(), "Wrote empty book"),
        }

        Ok(result)
    }
}

/// List the markdown chapter files of a book directory, sorted by name.
pub fn list_chapters(book_dir: &Path) -> crate::error::Result<Vec<PathBuf>> {
    if !book_dir.is_dir() {
        return Err(ChunkerError::MissingBookDir(book_dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(book_dir).map_err(|e| ChunkerError::io(book_dir, e))?;
    let mut chapters = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ChunkerError::io(book_dir, e))?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            chapters.push(path);
        }
    }
    chapters.sort();
    Ok(chapters)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! Chapter Chunker - Main Entry Point
//!
//! Chunks markdown textbook chapters into JSONL datasets, or serves the
//! chunking engine over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chapter_chunker::api::{self, handlers::AppState};
use chapter_chunker::batch::{BatchConfig, BatchProcessor};
use chapter_chunker::catalog::BookCatalog;
use chapter_chunker::chunkers::ChapterChunker;
use chapter_chunker::output::combine_jsonl;
use chapter_chunker::types::ServiceConfig;

#[derive(Parser)]
#[command(name = "chapter-chunker")]
#[command(about = "Structure-aware chunking of textbook markdown chapters")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./chunker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk one book, or every catalog book, into JSONL files
    Chunk {
        /// Merge-trigger floor in estimated tokens
        #[arg(long)]
        min_tokens: Option<usize>,

        /// Packing ceiling in estimated tokens
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Only chunk this book
        #[arg(long)]
        book: Option<String>,

        /// Root directory with one folder of chapters per book
        #[arg(long)]
        chapters_dir: Option<PathBuf>,

        /// Directory receiving the JSONL files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Serve the chunking engine over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = ServiceConfig::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Chunk {
            min_tokens,
            max_tokens,
            book,
            chapters_dir,
            output_dir,
        } => {
            if let Some(min) = min_tokens {
                config.chunking.min_tokens = min;
            }
            if let Some(max) = max_tokens {
                config.chunking.max_tokens = max;
            }
            if let Some(dir) = chapters_dir {
                config.chapters_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            config.chunking.validate()?;
            run_chunk(config, book).await
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            run_serve(config).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "chapter_chunker=info,tower_http=info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_chunk(config: ServiceConfig, book: Option<String>) -> Result<()> {
    let catalog = Arc::new(BookCatalog::new(config.books.clone()));
    let books: Vec<String> = match &book {
        Some(key) => vec![key.clone()],
        None => catalog.keys().map(String::from).collect(),
    };
    if books.is_empty() {
        bail!("no books to chunk: pass --book or add [[books]] entries to the configuration");
    }
    if let Some(key) = &book {
        if catalog.get(key).is_none() {
            warn!(book = %key, "Book not in catalog, metadata will fall back to the key");
        }
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    info!(
        min_tokens = config.chunking.min_tokens,
        max_tokens = config.chunking.max_tokens,
        books = books.len(),
        "Starting Chapter Chunker v{}",
        env!("CARGO_PKG_VERSION")
    );

    let processor = BatchProcessor::new(
        ChapterChunker::new(config.chunking),
        Arc::clone(&catalog),
        config.chapters_dir.clone(),
        BatchConfig {
            concurrency: config.concurrency,
            ..Default::default()
        },
    );

    let mut total_chunks = 0;
    for key in &books {
        let result = processor.write_book(key, &config.output_dir).await?;
        total_chunks += result.total_chunks;
    }

    if book.is_none() {
        let combined = config.output_dir.join("all.jsonl");
        let inputs: Vec<PathBuf> = books
            .iter()
            .map(|key| config.output_dir.join(format!("{}.jsonl", key)))
            .collect();
        combine_jsonl(&combined, &inputs)?;
        info!(chunks = total_chunks, file = %combined.display(), "Combined output written");
    }

    Ok(())
}

async fn run_serve(config: ServiceConfig) -> Result<()> {
    info!("Starting Chapter Chunker service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        min_tokens = config.chunking.min_tokens,
        max_tokens = config.chunking.max_tokens,
        "Default budgets"
    );

    let state = Arc::new(AppState {
        chunking: config.chunking,
    });
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

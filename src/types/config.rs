//! Configuration types for chunking.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::catalog::BookInfo;
use crate::error::{ChunkerError, Result};
use crate::{DEFAULT_CHARS_PER_TOKEN, DEFAULT_MAX_TOKENS, DEFAULT_MIN_TOKENS};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "chunker.toml";

/// Token budgets and estimation ratio consumed by the chunking engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunks below this estimate are candidates for merging
    pub min_tokens: usize,

    /// Hard packing ceiling for the assembler and the merger
    pub max_tokens: usize,

    /// Characters per estimated token
    pub chars_per_token: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_tokens: DEFAULT_MIN_TOKENS,
            max_tokens: DEFAULT_MAX_TOKENS,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl ChunkingConfig {
    /// Create a config with the given budgets and the default ratio.
    pub fn with_budget(min_tokens: usize, max_tokens: usize) -> Self {
        Self {
            min_tokens,
            max_tokens,
            ..Default::default()
        }
    }

    /// Set the characters-per-token ratio.
    pub fn with_ratio(mut self, chars_per_token: f64) -> Self {
        self.chars_per_token = chars_per_token;
        self
    }

    /// Check that the budgets and ratio are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 || self.min_tokens > self.max_tokens {
            return Err(ChunkerError::InvalidBudget {
                min_tokens: self.min_tokens,
                max_tokens: self.max_tokens,
            });
        }
        if !(self.chars_per_token.is_finite() && self.chars_per_token > 0.0) {
            return Err(ChunkerError::InvalidRatio(self.chars_per_token));
        }
        Ok(())
    }
}

/// Global configuration for the command-line tool and the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Engine budgets
    pub chunking: ChunkingConfig,

    /// Root holding one directory of markdown chapters per book
    pub chapters_dir: PathBuf,

    /// Directory receiving the JSONL files
    pub output_dir: PathBuf,

    /// Maximum chapters chunked concurrently
    pub concurrency: usize,

    /// HTTP port for `serve`
    pub port: u16,

    /// Book catalog, in processing order
    pub books: Vec<BookInfo>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            chapters_dir: PathBuf::from("chapters"),
            output_dir: PathBuf::from("chunks"),
            concurrency: 4,
            port: 3017,
            books: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional TOML file and `CHUNKER_*`
    /// environment variables, in that order of precedence.
    ///
    /// Without an explicit path, `chunker.toml` in the working directory is
    /// used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: ServiceConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("CHUNKER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.chunking.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    // Loading reads the process environment; keep env-mutating tests serial.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let config = ChunkingConfig::default();
        assert_eq!(config.min_tokens, 512);
        assert_eq!(config.max_tokens, 1536);
        assert_eq!(config.chars_per_token, 3.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_budgets() {
        assert!(matches!(
            ChunkingConfig::with_budget(600, 500).validate(),
            Err(ChunkerError::InvalidBudget { .. })
        ));
        assert!(ChunkingConfig::with_budget(0, 0).validate().is_err());
        assert!(matches!(
            ChunkingConfig::default().with_ratio(0.0).validate(),
            Err(ChunkerError::InvalidRatio(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
chapters_dir = "data/chapters"
concurrency = 2

[chunking]
min_tokens = 256
max_tokens = 1024

[[books]]
key = "ent"
name = "Elementary Number Theory"
subject = "number-theory"
level = "intro"

[[books.parts]]
name = "Foundations"
chapters = ["Prime Numbers"]
"#
        )
        .unwrap();

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = ServiceConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.chunking.min_tokens, 256);
        assert_eq!(config.chunking.max_tokens, 1024);
        assert_eq!(config.chunking.chars_per_token, 3.5);
        assert_eq!(config.chapters_dir, PathBuf::from("data/chapters"));
        assert_eq!(config.output_dir, PathBuf::from("chunks"));
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.books.len(), 1);
        assert_eq!(config.books[0].parts[0].chapters, vec!["Prime Numbers".to_string()]);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 1").unwrap();

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("CHUNKER_CHUNKING__MAX_TOKENS", "1024");
        let loaded = ServiceConfig::load(Some(file.path()));
        std::env::remove_var("CHUNKER_CHUNKING__MAX_TOKENS");

        let config = loaded.unwrap();
        assert_eq!(config.port, 1);
        assert_eq!(config.chunking.max_tokens, 1024);
        assert_eq!(config.chunking.min_tokens, 512);
    }

    #[test]
    fn test_load_rejects_bad_budget() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[chunking]\nmin_tokens = 900\nmax_tokens = 100").unwrap();
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(ServiceConfig::load(Some(file.path())).is_err());
    }
}

//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub processing: ProcessingConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Docwatch Configuration
# Watch directories, extract text, embed, and index documents.

[watch]
# Directories to watch for new or changed files
directories = [
    # "~/Documents/Inbox",
    # "~/Scans",
]

# File patterns to ignore
ignore_patterns = [
    "*.tmp",
    "*.temp",
    ".DS_Store",
    "._*",
    "*.part",
]

# Quiet period before a burst of events triggers processing (milliseconds)
debounce_ms = 100

# Delay before scanning a triggered path, letting writes settle (milliseconds)
settle_ms = 1000

[processing]
# What to do when the embedding stage fails:
#   "persist-partial" - store the document with whatever embeddings exist
#   "abort"           - mark the document failed and skip persistence
embed_failure_policy = "persist-partial"

# Pause between dispatching documents of one batch (milliseconds)
stagger_ms = 50

# Text chunking for the local tokenizer backend
chunk_size = 1000
chunk_overlap = 100

[ocr]
# OCR backend: "http" (remote service) or "tesseract" (local binary)
backend = "http"
host = "http://localhost:8081"
timeout_seconds = 120

[tokenizer]
# Tokenizer backend: "http" (remote chunk+embed service) or "ollama"
# (local chunker plus Ollama embeddings)
backend = "http"
host = "http://localhost:8082"
embedding_model = "nomic-embed-text"
timeout_seconds = 120

[search]
# Search/index service endpoint
host = "http://localhost:8083"

# Also write each document to a "<folder>-vector" destination for
# vector-capable sinks
vector_destinations = false
timeout_seconds = 60

[summarizer]
# Rewrite content/topic via an LLM after persistence
enabled = false
host = "http://localhost:11434"
model = "gpt-oss:20b"
timeout_seconds = 120
"#
        .to_string()
    }

    /// Add a directory to the watch list.
    pub fn add_watch_directory(&mut self, path: String) {
        if !self.watch.directories.contains(&path) {
            self.watch.directories.push(path);
        }
    }

    /// Remove a directory from the watch list.
    pub fn remove_watch_directory(&mut self, path: &str) {
        self.watch.directories.retain(|d| d != path);
    }
}

/// File watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub directories: Vec<String>,
    pub ignore_patterns: Vec<String>,
    /// Quiet period before a burst of events triggers processing.
    pub debounce_ms: u64,
    /// Delay before scanning a triggered path, letting writes settle.
    pub settle_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directories: vec![],
            ignore_patterns: vec![
                "*.tmp".to_string(),
                "*.temp".to_string(),
                ".DS_Store".to_string(),
                "._*".to_string(),
                "*.part".to_string(),
            ],
            debounce_ms: 100,
            settle_ms: 1000,
        }
    }
}

/// What to do when the embedding stage fails for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedFailurePolicy {
    /// Persist the document with whatever partial embeddings were gathered.
    #[default]
    PersistPartial,
    /// Mark the document failed and skip persistence.
    Abort,
}

/// Pipeline processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub embed_failure_policy: EmbedFailurePolicy,
    /// Pause between dispatching documents of one batch.
    pub stagger_ms: u64,
    /// Characters per chunk for the local tokenizer backend.
    pub chunk_size: usize,
    /// Overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            embed_failure_policy: EmbedFailurePolicy::PersistPartial,
            stagger_ms: 50,
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// OCR service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// "http" or "tesseract".
    pub backend: String,
    pub host: String,
    pub timeout_seconds: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            host: "http://localhost:8081".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Tokenizer/embeddings service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// "http" or "ollama".
    pub backend: String,
    pub host: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            host: "http://localhost:8082".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Search/index service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub host: String,
    /// Also write each document to a "<folder>-vector" destination.
    pub vector_destinations: bool,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8083".to_string(),
            vector_destinations: false,
            timeout_seconds: 60,
        }
    }
}

/// Summarizer/LLM settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub enabled: bool,
    pub host: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
            timeout_seconds: 120,
        }
    }
}

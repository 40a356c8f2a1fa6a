//! CLI command implementations.

pub mod config;
pub mod init;
pub mod scan;
pub mod watch;

use anyhow::{Context, Result};
use docwatch_config::{AppPaths, Config};
use docwatch_services::{
    recognizer_from_config, search_from_config, summarizer_from_config, tokenizer_from_config,
};
use docwatch_watch::Pipeline;
use std::sync::Arc;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config() -> Result<Config> {
    let paths = get_paths()?;
    Config::load_from(&paths.config_file).context("Failed to load config")
}

/// Build the pipeline with the service backends selected by configuration.
pub fn build_pipeline(config: &Config) -> Result<Arc<Pipeline>> {
    let recognizer =
        recognizer_from_config(&config.ocr).context("Failed to create OCR client")?;
    let tokenizer = tokenizer_from_config(&config.tokenizer, &config.processing)
        .context("Failed to create tokenizer client")?;
    let search = Arc::new(
        search_from_config(&config.search).context("Failed to create search client")?,
    );
    let summarizer =
        summarizer_from_config(&config.summarizer).context("Failed to create summarizer")?;

    Ok(Arc::new(Pipeline::new(
        recognizer, tokenizer, search, summarizer, config,
    )))
}

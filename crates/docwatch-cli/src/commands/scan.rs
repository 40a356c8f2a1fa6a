//! One-shot scan: enumerate a path and run the pipeline over it.

use super::{build_pipeline, load_config};
use anyhow::Result;
use colored::Colorize;
use docwatch_watch::{enumerate, EnumerateContext};
use glob::Pattern;
use std::path::PathBuf;
use std::time::Duration;

pub async fn run(path: &str) -> Result<()> {
    let config = load_config()?;

    let expanded = shellexpand::tilde(path).to_string();
    let target = PathBuf::from(&expanded);

    let folder_path = if target.is_dir() {
        target.clone()
    } else {
        target.parent().map(PathBuf::from).unwrap_or_else(|| target.clone())
    };
    let folder_id = folder_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| folder_path.to_string_lossy().to_string());

    let ctx = EnumerateContext {
        folder_id,
        folder_path: folder_path.to_string_lossy().to_string(),
        // No settle needed for an explicit one-shot scan
        settle: Duration::ZERO,
        ignore_patterns: config
            .watch
            .ignore_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect(),
    };

    println!("{} {}", "Scanning".cyan(), expanded);
    let documents = enumerate(&target, &ctx).await;

    if documents.is_empty() {
        println!("{}", "No documents found.".yellow());
        return Ok(());
    }

    println!("Processing {} document(s)...", documents.len());
    let pipeline = build_pipeline(&config)?;
    pipeline.process_batch(documents).await;

    println!("{}", "Done.".green());
    Ok(())
}

//! Watch command implementation.

use super::{build_pipeline, load_config};
use anyhow::Result;
use colored::Colorize;
use docwatch_watch::Watcher;
use std::path::PathBuf;
use tracing::info;

/// Start watching the configured directories.
pub async fn run() -> Result<()> {
    let config = load_config()?;

    if config.watch.directories.is_empty() {
        println!("{}", "No watch directories configured.".yellow());
        println!("Add directories with: docwatch config add-watch <path>");
        return Ok(());
    }

    println!("{}", "Starting watcher...".cyan());
    println!("Watching directories:");

    let mut directories = Vec::new();
    for dir in &config.watch.directories {
        let expanded = shellexpand::tilde(dir);
        let path = PathBuf::from(expanded.as_ref());
        if path.exists() {
            println!("  {} {}", "+".green(), dir);
            directories.push(path);
        } else {
            println!("  {} {} (not found)", "-".red(), dir);
        }
    }

    let pipeline = build_pipeline(&config)?;
    let watcher = Watcher::start(&config, pipeline)?;

    if let Err(e) = watcher.registry().attach(&directories) {
        println!("{} {}", "Warning:".yellow(), e);
    }

    println!("\nPress Ctrl+C to stop.\n");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    watcher.shutdown();
    println!("{}", "Stopped.".cyan());

    Ok(())
}

//! Initialize docwatch.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use docwatch_config::Config;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} docwatch is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        return Ok(());
    }

    println!("{}", "Initializing docwatch...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file)
        .context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    println!();
    println!("{}", "docwatch initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Add watch directories: {}",
        "docwatch config add-watch ~/Documents/Inbox".cyan()
    );
    println!("  2. Start watching: {}", "docwatch watch".cyan());

    Ok(())
}

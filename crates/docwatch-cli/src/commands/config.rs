//! Configuration commands.

use super::get_paths;
use anyhow::{Context, Result};
use colored::Colorize;
use docwatch_config::Config;

pub fn show() -> Result<()> {
    let paths = get_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'docwatch init' first.");
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn path() -> Result<()> {
    let paths = get_paths()?;
    println!("{}", paths.config_file.display());
    Ok(())
}

pub fn add_watch(path: &str) -> Result<()> {
    let paths = get_paths()?;
    let expanded = shellexpand::tilde(path).to_string();

    if !std::path::Path::new(&expanded).is_dir() {
        anyhow::bail!("Directory does not exist: {}", expanded);
    }

    let mut config =
        Config::load_from(&paths.config_file).context("Failed to load config")?;
    config.add_watch_directory(expanded.clone());
    config.save_to(&paths.config_file).context("Failed to save config")?;

    println!("{} Watching {}", "✓".green(), expanded);
    Ok(())
}

pub fn remove_watch(path: &str) -> Result<()> {
    let paths = get_paths()?;
    let expanded = shellexpand::tilde(path).to_string();

    let mut config =
        Config::load_from(&paths.config_file).context("Failed to load config")?;
    config.remove_watch_directory(&expanded);
    config.save_to(&paths.config_file).context("Failed to save config")?;

    println!("{} Removed {}", "✓".green(), expanded);
    Ok(())
}

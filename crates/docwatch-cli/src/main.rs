//! Docwatch CLI - watch directories, extract text, embed, and index documents.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Docwatch - watch directories and index their documents
#[derive(Parser)]
#[command(name = "docwatch")]
#[command(version)]
#[command(about = "Watch directories, extract text, embed, and index documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docwatch (create the config file)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Watch the configured directories and process changes
    Watch,

    /// Enumerate a path once and run the pipeline over it
    Scan {
        /// File or directory to process
        path: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,

    /// Print the config file location
    Path,

    /// Add a directory to the watch list
    AddWatch {
        /// Directory path
        path: String,
    },

    /// Remove a directory from the watch list
    RemoveWatch {
        /// Directory path
        path: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docwatch=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docwatch=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::AddWatch { path } => commands::config::add_watch(&path),
            ConfigCommands::RemoveWatch { path } => commands::config::remove_watch(&path),
        },
        Commands::Watch => commands::watch::run().await,
        Commands::Scan { path } => commands::scan::run(&path).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

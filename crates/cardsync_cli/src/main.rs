//! Cardsync CLI
//!
//! Keeps a Mochi deck in sync with a local text document.
//!
//! # Commands
//!
//! - `decks` - List the decks of the account
//! - `pull` - Write a deck to a local document
//! - `push` - Make the remote deck match a local document
//!
//! The API key is read from `MOCHI_API_KEY`, optionally via a `.env` file.

mod client;
mod commands;
mod config;
mod deck_file;

use cardsync_engine::SyncEngine;
use clap::{Parser, Subcommand};
use client::UreqClient;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sync flashcard decks between local documents and Mochi.
#[derive(Parser)]
#[command(name = "cardsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks
    Decks,

    /// Write a remote deck to a local document
    Pull {
        /// Id of the deck to pull
        deck_id: String,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        yes: bool,

        /// Directory to write the document to
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Make a remote deck match a local document
    Push {
        /// Deck document, named `<deck-name>-<deck_id>.md`
        file: PathBuf,

        /// Create cards even when the same content already exists remotely
        #[arg(short, long)]
        force: bool,

        /// Apply the plan without asking
        #[arg(short, long)]
        yes: bool,

        /// Dry run - show the plan without writing anything
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("cardsync v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    dotenv::dotenv().ok();
    let config = config::from_env()?;
    let client = UreqClient::new(config.timeout);
    let engine = SyncEngine::http(config, client)?;

    match cli.command {
        Commands::Decks => commands::decks::run(&engine)?,
        Commands::Pull { deck_id, yes, dir } => {
            commands::pull::run(&engine, &deck_id, &dir, yes)?;
        }
        Commands::Push {
            file,
            force,
            yes,
            dry_run,
        } => {
            let options = commands::push::PushOptions {
                force,
                yes,
                dry_run,
            };
            commands::push::run(&engine, &file, options)?;
        }
        Commands::Version => {}
    }

    Ok(())
}

//! Datakeeper CLI
//!
//! Command-line access to a local Datakeeper vault directory.
//!
//! # Commands
//!
//! - `keygen` - Generate a printable key
//! - `credential` - Add, update, remove and list login / password pairs
//! - `card` - Add, update, remove and list payment cards
//! - `file` - Upload, download, remove and list files
//!
//! All output is JSON on stdout. Logs go to stderr.

mod commands;

use clap::{Parser, Subcommand};
use commands::card::CardAction;
use commands::credential::CredentialAction;
use commands::file::FileAction;
use commands::LocalVault;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Datakeeper command-line vault.
#[derive(Parser)]
#[command(name = "datakeeper")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the vault directory
    #[arg(global = true, short, long, env = "DATAKEEPER_PATH", default_value = ".datakeeper")]
    path: PathBuf,

    /// Owner identity
    #[arg(global = true, short, long, env = "DATAKEEPER_OWNER")]
    owner: Option<String>,

    /// Owner key (16, 24 or 32 characters)
    #[arg(global = true, short, long, env = "DATAKEEPER_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a printable key
    Keygen {
        /// Key length (16, 24 or 32)
        #[arg(short, long, default_value = "32")]
        length: usize,
    },

    /// Manage login / password pairs
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },

    /// Manage payment cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },

    /// Manage files
    File {
        #[command(subcommand)]
        action: FileAction,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let open = || LocalVault::open(&cli.path, cli.owner.as_deref(), cli.key.as_deref());

    let output = match cli.command {
        Commands::Keygen { length } => commands::keygen::run(length)?,
        Commands::Credential { action } => commands::credential::run(&open()?, action)?,
        Commands::Card { action } => commands::card::run(&open()?, action)?,
        Commands::File { action } => commands::file::run(&open()?, action)?,
        Commands::Version => {
            println!("Datakeeper CLI v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! Wardrobe CLI - migrations, fixtures and manual function runs.
//!
//! # Usage
//!
//! ```bash
//! # Create the document table
//! wardrobe-cli migrate
//!
//! # Load fixtures
//! wardrobe-cli seed fixtures/demo.yaml
//!
//! # Rank a user's outfits
//! wardrobe-cli recommend --uid u1 --occasion work --limit 3
//!
//! # Re-run the fan-out for a wear log
//! wardrobe-cli replay-wear-log --uid u1 --log-id l1
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "wardrobe-cli")]
#[command(author, version, about = "Wardrobe functions CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run document store migrations
    Migrate,
    /// Load users' outfits, items and wear logs from a YAML file
    Seed {
        /// Path to the YAML seed file
        file: String,
    },
    /// Print outfit recommendations for a user
    Recommend {
        /// User to recommend for
        #[arg(short, long)]
        uid: String,

        /// Occasion to filter on (default: casual)
        #[arg(short, long)]
        occasion: Option<String>,

        /// Maximum number of outfits (default: 5)
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Run the wear log fan-out again for an existing log
    ReplayWearLog {
        /// Owner of the wear log
        #[arg(short, long)]
        uid: String,

        /// Wear log document id
        #[arg(short, long)]
        log_id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file } => commands::seed::run(&file).await,
        Commands::Recommend {
            uid,
            occasion,
            limit,
        } => commands::recommend::run(&uid, occasion, limit).await,
        Commands::ReplayWearLog { uid, log_id } => commands::replay::run(&uid, &log_id).await,
    }
}

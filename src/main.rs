mod api;
mod cli;
mod db;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pickem")]
#[command(about = "A playoff bracket pick'em service with live result scoring")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Fetch playoff results and rescore all predictions
    Sync {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show the current standings
    Leaderboard {
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
    /// Load sample results and demo predictions
    Seed,
    /// Initialize the database
    InitDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting Pick'em API server on port {}", port);
            api::serve(port).await?;
        }
        Some(Commands::Sync { year }) => {
            cli::sync_results(year).await?;
        }
        Some(Commands::Leaderboard { limit }) => {
            cli::show_leaderboard(limit).await?;
        }
        Some(Commands::Seed) => {
            cli::seed_sample_data().await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database().await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting Pick'em API server on port 3000");
            api::serve(3000).await?;
        }
    }

    Ok(())
}

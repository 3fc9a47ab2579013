//! Storyboard CLI binary.
//!
//! This binary provides command-line access to Storyboard:
//! - Turn a script into illustrated scenes
//! - Inspect, retry and delete stored results
//! - Export rendered images

use clap::Parser;
use storyboard::{StoryboardConfig, StoryboardResult};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn init_tracing(verbose: bool, json_logs: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn run(cli: Cli) -> StoryboardResult<()> {
    let config = StoryboardConfig::load_with_override(cli.config)?;

    match cli.command {
        Commands::Generate {
            script,
            aspect_ratio,
            out,
        } => cli::generate(&config, cli.api_key, script, aspect_ratio, out).await,
        Commands::History { limit } => cli::show_history(&config, limit).await,
        Commands::Batch { batch_id } => cli::show_batch(&config, &batch_id).await,
        Commands::Retry { id, suggested } => cli::retry(&config, cli.api_key, &id, suggested).await,
        Commands::Delete { id } => cli::delete(&config, &id).await,
        Commands::Download { id, out } => cli::download(&config, &id, out).await,
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

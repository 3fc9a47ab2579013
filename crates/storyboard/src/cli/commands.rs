//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use storyboard::AspectRatio;

/// Storyboard - turn narrative scripts into illustrated scenes
#[derive(Parser, Debug)]
#[command(name = "storyboard")]
#[command(about = "Turn narrative scripts into illustrated scenes", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Extra configuration file layered over the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key (defaults to GEMINI_API_KEY)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a script and render every scene
    Generate {
        /// Where the script comes from
        #[command(flatten)]
        script: ScriptSource,

        /// Aspect ratio of the rendered images (1:1, 16:9, 9:16, 4:3, 3:4)
        #[arg(long, default_value = "16:9")]
        aspect_ratio: AspectRatio,

        /// Export the rendered images to this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List recent results from history
    History {
        /// Maximum number of results to display
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show the stored results of one batch in scene order
    Batch {
        /// Batch id
        batch_id: String,
    },

    /// Render a result again
    Retry {
        /// Result id
        id: String,

        /// Use the suggested prompt when one is available
        #[arg(long)]
        suggested: bool,
    },

    /// Delete a result from history
    Delete {
        /// Result id
        id: String,
    },

    /// Write the image of a result to a file
    Download {
        /// Result id
        id: String,

        /// Target directory (defaults to the configured export directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Script input: inline text or a file.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ScriptSource {
    /// Script text
    #[arg(long)]
    pub text: Option<String>,

    /// Read the script from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

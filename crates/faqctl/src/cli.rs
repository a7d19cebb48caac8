//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default daemon address
pub const DEFAULT_URL: &str = "http://127.0.0.1:7870";

/// FAQ Assistant CLI
#[derive(Parser, Debug)]
#[command(name = "faqctl")]
#[command(about = "FAQ Assistant - keyword intent resolution tools", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $FAQ_CONFIG and defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the running daemon a question
    Ask {
        question: String,

        /// Daemon base URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Resolve a question offline against the keyword store
    Resolve {
        question: String,

        /// Database path (defaults to the configured one)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show the words two strings share
    Overlap { first: String, second: String },

    /// Find keywords of different intents that share many words
    Audit {
        #[arg(long)]
        db: Option<PathBuf>,

        /// Report pairs at or above this overlap percentage
        #[arg(long, default_value_t = 50.0)]
        min_percentage: f64,
    },

    /// Import intents, responses and keywords from a JSON seed file
    Import {
        file: PathBuf,

        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// List stored intents
    Intents {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

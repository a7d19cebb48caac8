//! faqctl - command-line tools for the FAQ assistant

use clap::Parser;
use faqctl::cli::{Cli, Commands};
use faqctl::client::ClientError;
use faqctl::commands;
use faqctl::errors::{EXIT_GENERAL_ERROR, EXIT_SUCCESS};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Quiet by default, RUST_LOG=debug shows match decisions
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            e.downcast_ref::<ClientError>()
                .map(ClientError::exit_code)
                .unwrap_or(EXIT_GENERAL_ERROR)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Ask { question, url } => commands::handle_ask(&question, &url).await,
        Commands::Resolve { question, db } => {
            commands::handle_resolve(&commands::load_config(config)?, &question, db)
        }
        Commands::Overlap { first, second } => {
            commands::handle_overlap(&commands::load_config(config)?, &first, &second)
        }
        Commands::Audit { db, min_percentage } => {
            commands::handle_audit(&commands::load_config(config)?, db, min_percentage)
        }
        Commands::Import { file, db } => {
            commands::handle_import(&commands::load_config(config)?, &file, db)
        }
        Commands::Intents { db } => commands::handle_intents(&commands::load_config(config)?, db),
    }
}

//! FAQ Daemon - keyword intent resolution gateway
//!
//! Answers questions from stored responses, falling back to a generative
//! model when no keyword matches.

use anyhow::Result;
use faq_common::FaqConfig;
use faqd::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("FAQ Daemon v{} starting", faq_common::VERSION);

    let config = FaqConfig::load();
    let state = server::build_state(&config)?;

    server::run(state, &config.server.bind_addr).await?;

    info!("FAQ Daemon stopped");
    Ok(())
}

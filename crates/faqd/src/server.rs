//! HTTP server for faqd

use crate::answers::AnswerService;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use chrono::{DateTime, Utc};
use faq_common::oracle::{FallbackOracle, LlmClient};
use faq_common::store::FaqDb;
use faq_common::{FaqConfig, Resolver};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    pub db: Arc<FaqDb>,
    pub answers: Arc<AnswerService>,
    pub start_time: Instant,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: Arc<FaqDb>, answers: AnswerService) -> Self {
        Self {
            db,
            answers: Arc::new(answers),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }
}

/// Open the store and wire resolver, oracle and answer service from config
pub fn build_state(config: &FaqConfig) -> Result<AppState> {
    let db = Arc::new(
        FaqDb::open(config.database.location())
            .with_context(|| format!("opening database {}", config.database.path.display()))?,
    );
    info!("  Database: {}", config.database.path.display());

    let matcher = config.build_matcher();
    info!("  Fuzzy threshold: {}", matcher.threshold());
    let resolver = Resolver::new(db.clone(), config.build_normalizer()?, matcher);

    let oracle: Arc<dyn FallbackOracle> = match LlmClient::from_config(&config.llm) {
        Ok(client) => {
            info!(
                "  Fallback model: {} ({:?})",
                config.llm.model.as_deref().unwrap_or("-"),
                config.llm.mode
            );
            Arc::new(client)
        }
        Err(e) => {
            warn!("  Fallback model unavailable ({}), unresolved questions get the apology", e);
            Arc::new(LlmClient::disabled())
        }
    };

    let answers = AnswerService::new(resolver, db.clone(), oracle, config.messages.clone());
    Ok(AppState::new(db, answers))
}

/// Build the router with all routes and layers
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::answer_routes())
        .merge(routes::health_routes())
        .merge(routes::intent_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until ctrl-c
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("  Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("  Shutdown requested");
}

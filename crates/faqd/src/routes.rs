//! API routes for faqd

use crate::answers::AnswerSource;
use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use faq_common::store::IntentInfo;
use faq_common::FaqError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Answer Routes
// ============================================================================

pub fn answer_routes() -> Router<AppStateArc> {
    Router::new().route("/get-answer", post(get_answer))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub intent_id: Option<i64>,
    pub response_id: Option<i64>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<AnswerSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: i32,
}

fn error_response(status: StatusCode, err: &FaqError) -> Response {
    let body = ErrorResponse {
        error: err.to_string(),
        code: err.code(),
    };
    (status, Json(body)).into_response()
}

async fn get_answer(
    State(state): State<AppStateArc>,
    body: Option<Json<AnswerRequest>>,
) -> Response {
    // Missing or unparseable body is a blank question
    let req = body.map(|Json(req)| req).unwrap_or_default();
    info!("  Question: {:?}", req.question);

    // Store reads and the oracle call block
    let answers = state.answers.clone();
    let question = req.question;
    let result = tokio::task::spawn_blocking(move || answers.answer(&question)).await;

    match result {
        Ok(Ok(answer)) => Json(AnswerResponse {
            intent_id: answer.resolution.intent_id,
            response_id: answer.resolution.response_id,
            answer: answer.text,
            source: Some(answer.source),
        })
        .into_response(),
        Ok(Err(FaqError::InvalidInput)) => {
            let body = AnswerResponse {
                intent_id: None,
                response_id: None,
                answer: state.answers.messages().invalid_question.clone(),
                source: None,
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Ok(Err(e @ FaqError::StoreUnavailable(_))) => {
            error!("  Keyword store unavailable: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, &e)
        }
        Ok(Err(e)) => {
            error!("  Answer failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
        Err(e) => {
            error!("  Answer task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: -32603,
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    /// None when the store could not be read
    pub keyword_count: Option<usize>,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let db = state.db.clone();
    let keyword_count = tokio::task::spawn_blocking(move || db.keyword_count())
        .await
        .ok()
        .and_then(Result::ok);

    let status = if keyword_count.is_some() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: faq_common::VERSION.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        started_at: state.started_at,
        keyword_count,
    })
}

// ============================================================================
// Intent Routes
// ============================================================================

pub fn intent_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/intents", get(list_intents))
}

async fn list_intents(State(state): State<AppStateArc>) -> Result<Json<Vec<IntentInfo>>, Response> {
    let db = state.db.clone();
    match tokio::task::spawn_blocking(move || db.list_intents()).await {
        Ok(Ok(intents)) => Ok(Json(intents)),
        Ok(Err(e)) => {
            error!("  Failed to list intents: {}", e);
            Err(error_response(StatusCode::SERVICE_UNAVAILABLE, &e))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()),
    }
}

//! HTTP client for communicating with faqd.

use crate::errors::{EXIT_DAEMON_UNAVAILABLE, EXIT_GENERAL_ERROR, EXIT_INVALID_RESPONSE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Cannot reach FAQ daemon at {url}: {reason}\n\nIs faqd running? Try: systemctl status faqd")]
    Unavailable { url: String, reason: String },

    #[error("Invalid response from daemon: {0}")]
    InvalidResponse(String),

    #[error("Daemon returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl ClientError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Unavailable { .. } => EXIT_DAEMON_UNAVAILABLE,
            ClientError::InvalidResponse(_) => EXIT_INVALID_RESPONSE,
            ClientError::Status { .. } => EXIT_GENERAL_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

/// Body of a /get-answer reply
#[derive(Debug, Clone, Deserialize)]
pub struct AskResponse {
    pub intent_id: Option<i64>,
    pub response_id: Option<i64>,
    pub answer: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Client for communicating with faqd
pub struct FaqdClient {
    base_url: String,
    http: reqwest::Client,
}

impl FaqdClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Unavailable {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// POST a question to /get-answer.
    ///
    /// A 400 still carries an answer body (the invalid-question message).
    pub async fn ask(&self, question: &str) -> Result<AskResponse, ClientError> {
        let url = format!("{}/get-answer", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| ClientError::Unavailable {
                url: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<AskResponse>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

//! Answer orchestration for the gateway.
//!
//! resolve -> stored response -> generative fallback -> apology.
//! A resolved pair without a response row is treated as unresolved.

use faq_common::config::MessagesConfig;
use faq_common::oracle::FallbackOracle;
use faq_common::{FaqError, ResolutionResult, Resolver, ResponseStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Stored response for a matched keyword
    Stored,
    /// Generative fallback
    Generated,
    /// Fixed apology after a fallback failure
    Apology,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub resolution: ResolutionResult,
    pub text: String,
    pub source: AnswerSource,
}

pub struct AnswerService {
    resolver: Resolver,
    responses: Arc<dyn ResponseStore>,
    oracle: Arc<dyn FallbackOracle>,
    messages: MessagesConfig,
}

impl AnswerService {
    pub fn new(
        resolver: Resolver,
        responses: Arc<dyn ResponseStore>,
        oracle: Arc<dyn FallbackOracle>,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            resolver,
            responses,
            oracle,
            messages,
        }
    }

    pub fn messages(&self) -> &MessagesConfig {
        &self.messages
    }

    /// Answer a question. Blocking: store reads and the oracle call are
    /// synchronous, so async callers should use `spawn_blocking`.
    ///
    /// Errors are `InvalidInput` and `StoreUnavailable` only; oracle
    /// failures become the apology message.
    pub fn answer(&self, question: &str) -> Result<Answer, FaqError> {
        let resolution = self.resolver.resolve_question(question)?;

        if let Some((intent_id, response_id)) = resolution.pair() {
            match self.responses.response_text(intent_id, response_id)? {
                Some(text) => {
                    info!("Answered from store: intent={} response={}", intent_id, response_id);
                    return Ok(Answer {
                        resolution,
                        text,
                        source: AnswerSource::Stored,
                    });
                }
                None => warn!(
                    "No response row for intent={} response={}, using fallback",
                    intent_id, response_id
                ),
            }
        }

        Ok(self.fallback(question.trim()))
    }

    fn fallback(&self, question: &str) -> Answer {
        match self.oracle.complete(question) {
            Ok(text) => {
                info!("Answered by generative fallback");
                Answer {
                    resolution: ResolutionResult::unresolved(),
                    text,
                    source: AnswerSource::Generated,
                }
            }
            Err(e) => {
                warn!("Fallback oracle failed: {}", e);
                Answer {
                    resolution: ResolutionResult::unresolved(),
                    text: self.messages.oracle_apology.clone(),
                    source: AnswerSource::Apology,
                }
            }
        }
    }
}

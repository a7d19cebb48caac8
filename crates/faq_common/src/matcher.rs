//! Two-phase keyword matcher.
//!
//! Phase 1 scans the length-descending index for the first keyword that
//! appears in the question as a contiguous run of whole words. Phase 2
//! runs only when phase 1 finds nothing: every keyword is scored with the
//! token-set ratio and the best one wins if it reaches the threshold.

use crate::keyword_index::KeywordIndex;
use crate::normalize::NormalizedText;
use crate::similarity::token_set_ratio;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum token-set score (inclusive) for a fuzzy match
pub const DEFAULT_FUZZY_THRESHOLD: u32 = 85;

/// Resolved (intent, response) pair, or both absent when unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub intent_id: Option<i64>,
    pub response_id: Option<i64>,
}

impl ResolutionResult {
    pub fn resolved(intent_id: i64, response_id: i64) -> Self {
        Self {
            intent_id: Some(intent_id),
            response_id: Some(response_id),
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Both ids, or None. A partial pair counts as unresolved.
    pub fn pair(&self) -> Option<(i64, i64)> {
        match (self.intent_id, self.response_id) {
            (Some(intent_id), Some(response_id)) => Some((intent_id, response_id)),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.pair().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    threshold: u32,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD)
    }
}

impl Matcher {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn resolve(&self, question: &NormalizedText, index: &KeywordIndex) -> ResolutionResult {
        if question.is_empty() || index.is_empty() {
            return ResolutionResult::unresolved();
        }

        if let Some(result) = self.exact_match(question, index) {
            return result;
        }

        self.fuzzy_match(question, index)
    }

    fn exact_match(&self, question: &NormalizedText, index: &KeywordIndex) -> Option<ResolutionResult> {
        let haystack = format!(" {} ", question.joined());

        for entry in index.iter() {
            if entry.joined.is_empty() {
                continue;
            }
            if haystack.contains(&format!(" {} ", entry.joined)) {
                debug!(
                    "Exact keyword match '{}' -> intent={} response={}",
                    entry.joined, entry.record.intent_id, entry.record.response_id
                );
                return Some(ResolutionResult::resolved(
                    entry.record.intent_id,
                    entry.record.response_id,
                ));
            }
        }

        None
    }

    fn fuzzy_match(&self, question: &NormalizedText, index: &KeywordIndex) -> ResolutionResult {
        let mut best: Option<(u32, ResolutionResult, &str)> = None;

        for entry in index.iter() {
            let score = token_set_ratio(question, &entry.normalized);
            // Strictly greater: the first keyword seen keeps ties
            if best.as_ref().map_or(score > 0, |(top, _, _)| score > *top) {
                best = Some((
                    score,
                    ResolutionResult::resolved(entry.record.intent_id, entry.record.response_id),
                    entry.joined.as_str(),
                ));
            }
        }

        match best {
            Some((score, result, keyword)) if score >= self.threshold => {
                debug!("Fuzzy keyword match '{}' score={}", keyword, score);
                result
            }
            Some((score, _, keyword)) => {
                debug!(
                    "Best fuzzy candidate '{}' score={} below threshold {}",
                    keyword, score, self.threshold
                );
                ResolutionResult::unresolved()
            }
            None => ResolutionResult::unresolved(),
        }
    }
}

//! Resolution façade: blank-input check, keyword fetch, index build, match.
//!
//! The resolver never calls the response store or the fallback oracle.
//! Callers branch on an unresolved result themselves.

use crate::error::FaqError;
use crate::keyword_index::{KeywordIndex, KeywordRecord};
use crate::matcher::{Matcher, ResolutionResult};
use crate::normalize::Normalizer;
use std::sync::Arc;
use tracing::debug;

/// Read access to the keyword table
pub trait KeywordStore: Send + Sync {
    /// All keyword rows, in store order
    fn load_keywords(&self) -> Result<Vec<KeywordRecord>, FaqError>;
}

/// Read access to stored responses
pub trait ResponseStore: Send + Sync {
    /// Response text for the pair, or None when no row matches
    fn response_text(&self, intent_id: i64, response_id: i64) -> Result<Option<String>, FaqError>;
}

impl KeywordStore for Vec<KeywordRecord> {
    fn load_keywords(&self) -> Result<Vec<KeywordRecord>, FaqError> {
        Ok(self.clone())
    }
}

pub struct Resolver {
    store: Arc<dyn KeywordStore>,
    normalizer: Normalizer,
    matcher: Matcher,
}

impl Resolver {
    pub fn new(store: Arc<dyn KeywordStore>, normalizer: Normalizer, matcher: Matcher) -> Self {
        Self {
            store,
            normalizer,
            matcher,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Resolve a raw question against the current keyword table.
    ///
    /// Keywords are fetched on every call so table edits take effect
    /// immediately.
    pub fn resolve_question(&self, raw: &str) -> Result<ResolutionResult, FaqError> {
        if raw.trim().is_empty() {
            return Err(FaqError::InvalidInput);
        }

        let records = self.store.load_keywords()?;
        let index = KeywordIndex::build(records, &self.normalizer);
        let question = self.normalizer.normalize(raw);

        let result = self.matcher.resolve(&question, &index);
        debug!(
            "Resolved '{}' against {} keywords: {:?}",
            question.joined(),
            index.len(),
            result.pair()
        );
        Ok(result)
    }
}

//! Keyword index, rebuilt on every resolution call.
//!
//! Records are ordered by normalized keyword length, longest first, so a
//! specific phrase ("return policy") is tested before a generic word it
//! contains ("return"). The sort is stable: equal lengths keep store order.

use crate::normalize::{NormalizedText, Normalizer};
use serde::{Deserialize, Serialize};

/// Raw keyword row as read from the keyword store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub keyword: String,
    pub intent_id: i64,
    pub response_id: i64,
}

impl KeywordRecord {
    pub fn new(keyword: impl Into<String>, intent_id: i64, response_id: i64) -> Self {
        Self {
            keyword: keyword.into(),
            intent_id,
            response_id,
        }
    }
}

/// Keyword record with its normalized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedKeyword {
    pub record: KeywordRecord,
    pub normalized: NormalizedText,
    /// Joined normalized form, computed once per build
    pub joined: String,
}

/// Length-descending keyword sequence
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: Vec<IndexedKeyword>,
}

impl KeywordIndex {
    pub fn build(records: Vec<KeywordRecord>, normalizer: &Normalizer) -> Self {
        let mut entries: Vec<IndexedKeyword> = records
            .into_iter()
            .map(|record| {
                let normalized = normalizer.normalize(&record.keyword);
                let joined = normalized.joined();
                IndexedKeyword {
                    record,
                    normalized,
                    joined,
                }
            })
            .collect();

        // sort_by is stable
        entries.sort_by(|a, b| b.normalized.char_len().cmp(&a.normalized.char_len()));

        Self { entries }
    }

    pub fn entries(&self) -> &[IndexedKeyword] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedKeyword> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

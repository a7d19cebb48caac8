//! Keyword audit - finds keywords of different intents that share words.
//!
//! Heavily overlapping keywords make exact matching depend on storage order
//! and fuzzy matching ambiguous, so they are worth reviewing.

use faq_common::{word_overlap, KeywordRecord, Normalizer, WordOverlap};

/// A pair of keywords from different intents
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapFinding {
    pub first: KeywordRecord,
    pub second: KeywordRecord,
    pub overlap: WordOverlap,
}

/// Every cross-intent keyword pair whose overlap is at least `min_percentage`,
/// highest overlap first.
pub fn find_overlaps(
    records: &[KeywordRecord],
    normalizer: &Normalizer,
    min_percentage: f64,
) -> Vec<OverlapFinding> {
    let mut findings = Vec::new();

    for (i, first) in records.iter().enumerate() {
        for second in &records[i + 1..] {
            if first.intent_id == second.intent_id {
                continue;
            }
            let overlap = word_overlap(normalizer, &first.keyword, &second.keyword);
            if overlap.matching_words.is_empty() || overlap.matching_percentage < min_percentage {
                continue;
            }
            findings.push(OverlapFinding {
                first: first.clone(),
                second: second.clone(),
                overlap,
            });
        }
    }

    findings.sort_by(|a, b| {
        b.overlap
            .matching_percentage
            .total_cmp(&a.overlap.matching_percentage)
    });
    findings
}

//! Similarity metrics between normalized texts.
//!
//! `token_set_ratio` drives the fuzzy phase of the matcher.
//! `word_overlap` is a looser diagnostic used for keyword-quality audits.

use crate::normalize::{NormalizedText, Normalizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Order- and duplicate-insensitive similarity in 0..=100.
///
/// Compares the sorted shared tokens against each side's shared tokens
/// plus its remainder, and keeps the best pairwise ratio. Identical token
/// sets, or one set contained in the other, score 100.
pub fn token_set_ratio(a: &NormalizedText, b: &NormalizedText) -> u32 {
    let set_a = a.token_set();
    let set_b = b.token_set();
    if set_a.is_empty() || set_b.is_empty() {
        return 0;
    }

    // BTreeSet iteration is already sorted
    let shared: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    let t0 = shared.join(" ");
    let t1 = format!("{} {}", t0, only_a.join(" ")).trim().to_string();
    let t2 = format!("{} {}", t0, only_b.join(" ")).trim().to_string();

    ratio(&t0, &t1).max(ratio(&t0, &t2)).max(ratio(&t1, &t2))
}

/// Indel similarity: 2 * LCS / (|a| + |b|), scaled to 0..=100.
///
/// Halves round to even, so 84.5 scores 84.
fn ratio(a: &str, b: &str) -> u32 {
    let len = a.chars().count() + b.chars().count();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let lcs = textdistance::str::lcsseq(a, b);
    let score = 200.0 * lcs as f64 / len as f64;
    score.round_ties_even() as u32
}

/// Shared words between two strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordOverlap {
    /// Sorted shared words
    pub matching_words: Vec<String>,
    /// Shared words over all distinct words, 0..=100, two decimals
    pub matching_percentage: f64,
}

/// Fraction of shared words over the union of words
pub fn word_overlap(normalizer: &Normalizer, a: &str, b: &str) -> WordOverlap {
    let a = normalizer.normalize(a);
    let b = normalizer.normalize(b);
    let set_a = a.token_set();
    let set_b = b.token_set();

    let matching: BTreeSet<&str> = set_a.intersection(&set_b).copied().collect();
    let total = set_a.union(&set_b).count();

    let matching_percentage = if total > 0 {
        let pct = matching.len() as f64 / total as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    } else {
        0.0
    };

    WordOverlap {
        matching_words: matching.into_iter().map(str::to_string).collect(),
        matching_percentage,
    }
}

//! Text normalization for matching.
//!
//! Every question and keyword goes through the same pipeline:
//! lowercase, strip punctuation, segment into word units.
//!
//! Segmentation is pluggable. Whitespace splitting is enough for English,
//! but Vietnamese words span several space-separated syllables
//! ("sinh viên", "học phí"), so a lexicon-driven segmenter groups them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Anything that is not a word character or whitespace
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("static regex"));

/// Splits cleaned text into word units
pub trait Segmenter: Send + Sync + fmt::Debug {
    /// Segment lowercase, punctuation-free text. Must be deterministic.
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Splits on Unicode whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Greedy longest-match segmenter over a dictionary of compound words.
///
/// Syllables of a matched compound stay space-separated inside one token,
/// so the joined form of the output is identical to whitespace splitting.
#[derive(Debug, Clone, Default)]
pub struct LexiconSegmenter {
    compounds: HashSet<String>,
    max_syllables: usize,
}

impl LexiconSegmenter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compounds = HashSet::new();
        let mut max_syllables = 1;

        for word in words {
            let syllables: Vec<String> = clean(word.as_ref())
                .split_whitespace()
                .map(str::to_string)
                .collect();
            // Single syllables are already units
            if syllables.len() < 2 {
                continue;
            }
            max_syllables = max_syllables.max(syllables.len());
            compounds.insert(syllables.join(" "));
        }

        Self {
            compounds,
            max_syllables,
        }
    }

    pub fn len(&self) -> usize {
        self.compounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }
}

impl Segmenter for LexiconSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let syllables: Vec<&str> = text.split_whitespace().collect();
        let mut tokens = Vec::with_capacity(syllables.len());
        let mut i = 0;

        while i < syllables.len() {
            let longest = self.max_syllables.min(syllables.len() - i);
            let mut taken = 1;

            for n in (2..=longest).rev() {
                let candidate = syllables[i..i + n].join(" ");
                if self.compounds.contains(&candidate) {
                    tokens.push(candidate);
                    taken = n;
                    break;
                }
            }

            if taken == 1 {
                tokens.push(syllables[i].to_string());
            }
            i += taken;
        }

        tokens
    }
}

/// Lowercase, trimmed, punctuation-free text (before segmentation)
fn clean(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    PUNCTUATION.replace_all(&lower, "").into_owned()
}

/// Ordered word tokens of a normalized text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    tokens: Vec<String>,
}

impl NormalizedText {
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces, used for containment and ratio metrics
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }

    /// Distinct tokens, used for overlap metrics
    pub fn token_set(&self) -> BTreeSet<&str> {
        self.tokens.iter().map(String::as_str).collect()
    }

    /// Length of the joined form in characters
    pub fn char_len(&self) -> usize {
        let chars: usize = self.tokens.iter().map(|t| t.chars().count()).sum();
        chars + self.tokens.len().saturating_sub(1)
    }
}

/// Normalization pipeline shared by questions and keywords
#[derive(Debug, Clone)]
pub struct Normalizer {
    segmenter: Arc<dyn Segmenter>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(WhitespaceSegmenter))
    }
}

impl Normalizer {
    pub fn new(segmenter: Arc<dyn Segmenter>) -> Self {
        Self { segmenter }
    }

    pub fn normalize(&self, text: &str) -> NormalizedText {
        let cleaned = clean(text);
        if cleaned.trim().is_empty() {
            return NormalizedText::default();
        }
        NormalizedText::from_tokens(self.segmenter.segment(&cleaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let n = Normalizer::default();
        let text = n.normalize("Return Policy?");
        assert_eq!(text.tokens(), &["return", "policy"]);
        assert_eq!(text, n.normalize("return policy"));
    }

    #[test]
    fn test_keeps_digits_and_diacritics() {
        let n = Normalizer::default();
        let text = n.normalize("Học phí năm 2024 là bao nhiêu?");
        assert_eq!(text.joined(), "học phí năm 2024 là bao nhiêu");
    }

    #[test]
    fn test_empty_and_punctuation_only_input() {
        let n = Normalizer::default();
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("   ").is_empty());
        assert!(n.normalize("?!...").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let n = Normalizer::default();
        let a = n.normalize("Where is the LIBRARY, please?");
        let b = n.normalize("Where is the LIBRARY, please?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_lexicon_groups_compounds() {
        let seg = LexiconSegmenter::new(["sinh viên", "học phí", "đại học"]);
        let n = Normalizer::new(Arc::new(seg));
        let text = n.normalize("Học phí cho sinh viên năm nhất?");
        assert_eq!(text.tokens(), &["học phí", "cho", "sinh viên", "năm", "nhất"]);
        // Joined form matches plain whitespace segmentation
        assert_eq!(text.joined(), "học phí cho sinh viên năm nhất");
    }

    #[test]
    fn test_lexicon_prefers_longest_compound() {
        let seg = LexiconSegmenter::new(["công nghệ", "công nghệ thông tin"]);
        let tokens = seg.segment("ngành công nghệ thông tin");
        assert_eq!(tokens, vec!["ngành", "công nghệ thông tin"]);
    }

    #[test]
    fn test_lexicon_ignores_single_syllables() {
        let seg = LexiconSegmenter::new(["a", "b c"]);
        assert_eq!(seg.len(), 1);
    }

    #[test]
    fn test_char_len_counts_characters_not_bytes() {
        let n = Normalizer::default();
        assert_eq!(n.normalize("học phí").char_len(), 7);
        assert_eq!(n.normalize("").char_len(), 0);
    }
}

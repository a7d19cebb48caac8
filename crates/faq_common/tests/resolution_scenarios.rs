//! End-to-end resolution against a SQLite keyword store.
//!
//! Covers the precedence, fuzzy fallback and freshness guarantees the
//! gateway relies on.

use faq_common::store::FaqDb;
use faq_common::{
    FaqConfig, FaqError, KeywordStore, Matcher, Normalizer, ResolutionResult, Resolver,
    ResponseStore,
};
use std::sync::Arc;
use tempfile::tempdir;

struct Fixture {
    _dir: tempfile::TempDir,
    db: Arc<FaqDb>,
    returns: (i64, i64),
    refunds: (i64, i64),
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let db = Arc::new(FaqDb::open_path(dir.path().join("faq.db")).unwrap());

    let returns_intent = db.add_intent("return_policy").unwrap();
    let returns_response = db
        .add_response(returns_intent, "Items can be returned within 30 days.")
        .unwrap();
    let refunds_intent = db.add_intent("returns_generic").unwrap();
    let refunds_response = db
        .add_response(refunds_intent, "Ask at the front desk about returns.")
        .unwrap();

    // Generic keyword stored first: ordering must still prefer the specific one
    db.add_keyword("return", refunds_intent, refunds_response).unwrap();
    db.add_keyword("return policy", returns_intent, returns_response)
        .unwrap();

    Fixture {
        _dir: dir,
        db,
        returns: (returns_intent, returns_response),
        refunds: (refunds_intent, refunds_response),
    }
}

fn resolver(db: Arc<FaqDb>) -> Resolver {
    Resolver::new(db, Normalizer::default(), Matcher::default())
}

#[test]
fn specific_keyword_beats_generic() {
    let f = fixture();
    let result = resolver(f.db.clone())
        .resolve_question("What is your return policy?")
        .unwrap();
    assert_eq!(result.pair(), Some(f.returns));
}

#[test]
fn refund_question_resolves_to_policy() {
    let f = fixture();
    let result = resolver(f.db.clone())
        .resolve_question("Can I get a refund under your return policy")
        .unwrap();
    assert_eq!(result.pair(), Some(f.returns));

    let (intent, response) = result.pair().unwrap();
    assert_eq!(
        f.db.response_text(intent, response).unwrap().as_deref(),
        Some("Items can be returned within 30 days.")
    );
}

#[test]
fn generic_keyword_still_matches_alone() {
    let f = fixture();
    let result = resolver(f.db.clone())
        .resolve_question("how do I return this")
        .unwrap();
    assert_eq!(result.pair(), Some(f.refunds));
}

#[test]
fn plural_without_exact_match_is_unresolved() {
    let f = fixture();
    let result = resolver(f.db.clone())
        .resolve_question("tell me about returns")
        .unwrap();
    assert_eq!(result, ResolutionResult::unresolved());
}

#[test]
fn plural_single_word_resolves_fuzzily() {
    let f = fixture();
    // "returns" vs "return" scores 92, "returns" vs "return policy" only 60
    let result = resolver(f.db.clone()).resolve_question("returns?").unwrap();
    assert_eq!(result.pair(), Some(f.refunds));
}

#[test]
fn blank_question_is_invalid_input() {
    let f = fixture();
    let r = resolver(f.db.clone());
    assert!(matches!(r.resolve_question(""), Err(FaqError::InvalidInput)));
    assert!(matches!(r.resolve_question(" \t "), Err(FaqError::InvalidInput)));
}

#[test]
fn new_keywords_visible_without_restart() {
    let f = fixture();
    let r = resolver(f.db.clone());
    assert!(!r.resolve_question("opening hours").unwrap().is_resolved());

    let hours = f.db.add_intent("hours").unwrap();
    let response = f.db.add_response(hours, "8am to 5pm.").unwrap();
    f.db.add_keyword("opening hours", hours, response).unwrap();

    assert_eq!(
        r.resolve_question("What are the opening hours?").unwrap().pair(),
        Some((hours, response))
    );
    assert_eq!(f.db.load_keywords().unwrap().len(), 3);
}

#[test]
fn vietnamese_compounds_with_lexicon() {
    let dir = tempdir().unwrap();
    let db = Arc::new(FaqDb::open_path(dir.path().join("faq.db")).unwrap());
    let fees = db.add_intent("hoc_phi").unwrap();
    let response = db.add_response(fees, "Học phí là 15 triệu/năm.").unwrap();
    db.add_keyword("học phí sinh viên", fees, response).unwrap();

    let mut config = FaqConfig::default();
    config.normalizer.segmenter = faq_common::config::SegmenterKind::Lexicon;
    config.normalizer.lexicon = vec!["học phí".to_string(), "sinh viên".to_string()];

    let r = Resolver::new(
        db.clone(),
        config.build_normalizer().unwrap(),
        config.build_matcher(),
    );

    // Word order differs, so only the token-set phase can match
    let result = r.resolve_question("Sinh viên đóng học phí?").unwrap();
    assert_eq!(result.pair(), Some((fees, response)));
}

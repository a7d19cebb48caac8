//! Command handlers for faqctl.

pub mod audit;

use anyhow::{Context, Result};
use faq_common::store::{FaqDb, SeedFile};
use faq_common::{word_overlap, FaqConfig, KeywordStore, Resolver, ResponseStore};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::client::FaqdClient;

const THIN_SEP: &str = "------------------------------------------------------------";

/// Config from an explicit path, or the standard lookup
pub fn load_config(path: Option<&Path>) -> Result<FaqConfig> {
    match path {
        Some(path) => FaqConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(FaqConfig::load()),
    }
}

fn open_db(config: &FaqConfig, db: Option<PathBuf>) -> Result<FaqDb> {
    debug!("Opening database (override: {:?})", db);
    match db {
        Some(path) => FaqDb::open_path(&path),
        None => FaqDb::open(config.database.location()),
    }
}

/// Handle ask command
pub async fn handle_ask(question: &str, url: &str) -> Result<()> {
    let client = FaqdClient::new(url)?;
    let reply = client.ask(question).await?;

    match (reply.intent_id, reply.response_id) {
        (Some(intent), Some(response)) => println!(
            "{}",
            format!("[intent {} / response {}]", intent, response).dimmed()
        ),
        _ => {
            let source = reply.source.as_deref().unwrap_or("invalid");
            println!("{}", format!("[{}]", source).dimmed());
        }
    }
    println!("{}", reply.answer);
    Ok(())
}

/// Handle resolve command
pub fn handle_resolve(config: &FaqConfig, question: &str, db: Option<PathBuf>) -> Result<()> {
    let db = Arc::new(open_db(config, db)?);
    let resolver = Resolver::new(db.clone(), config.build_normalizer()?, config.build_matcher());

    let result = resolver.resolve_question(question)?;
    debug!(
        "Resolved with threshold {}: {:?}",
        resolver.matcher().threshold(),
        result
    );
    match result.pair() {
        Some((intent, response)) => {
            println!(
                "{} intent={} response={}",
                "resolved".green().bold(),
                intent,
                response
            );
            match db.response_text(intent, response)? {
                Some(text) => println!("  {}", text),
                None => println!("  {}", "(no stored response text)".yellow()),
            }
        }
        None => println!("{}", "unresolved".yellow().bold()),
    }
    Ok(())
}

/// Handle overlap command
pub fn handle_overlap(config: &FaqConfig, first: &str, second: &str) -> Result<()> {
    let normalizer = config.build_normalizer()?;
    let overlap = word_overlap(&normalizer, first, second);

    println!("  Matching words: {}", overlap.matching_words.join(", "));
    println!("  Overlap:        {:.2}%", overlap.matching_percentage);
    Ok(())
}

/// Handle audit command
pub fn handle_audit(config: &FaqConfig, db: Option<PathBuf>, min_percentage: f64) -> Result<()> {
    let db = open_db(config, db)?;
    let normalizer = config.build_normalizer()?;
    let records = db.load_keywords()?;
    debug!("Auditing {} keywords at {:.2}%", records.len(), min_percentage);

    let findings = audit::find_overlaps(&records, &normalizer, min_percentage);

    println!();
    println!("{}", "  Keyword Overlap Audit".bold());
    println!("{}", THIN_SEP);
    println!(
        "  {} keywords, {} cross-intent pairs at or above {:.2}%",
        records.len(),
        findings.len(),
        min_percentage
    );
    println!();

    for finding in &findings {
        println!(
            "  {:>6.2}%  {:?} (intent {})  <->  {:?} (intent {})",
            finding.overlap.matching_percentage,
            finding.first.keyword,
            finding.first.intent_id,
            finding.second.keyword,
            finding.second.intent_id
        );
        println!(
            "           shared: {}",
            finding.overlap.matching_words.join(", ").cyan()
        );
    }

    println!("{}", THIN_SEP);
    Ok(())
}

/// Handle import command
pub fn handle_import(config: &FaqConfig, file: &Path, db: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading seed file {}", file.display()))?;
    let seed: SeedFile = serde_json::from_str(&content)
        .with_context(|| format!("parsing seed file {}", file.display()))?;

    let db = open_db(config, db)?;
    let summary = db.import_seed(&seed)?;

    println!(
        "{} {} intents, {} responses, {} keywords",
        "Imported".green().bold(),
        summary.intents,
        summary.responses,
        summary.keywords
    );
    Ok(())
}

/// Handle intents command
pub fn handle_intents(config: &FaqConfig, db: Option<PathBuf>) -> Result<()> {
    let db = open_db(config, db)?;
    let intents = db.list_intents()?;

    if intents.is_empty() {
        println!("  No intents stored.");
        return Ok(());
    }
    for intent in intents {
        println!("  {:>4}  {}", intent.id, intent.name);
    }
    Ok(())
}

// SQLite-backed keyword and response stores
//
// Tables mirror the FAQ schema: intents, responses, keywords_responses.
// The resolution path only reads; the write helpers exist for seeding.

use crate::error::FaqError;
use crate::keyword_index::KeywordRecord;
use crate::resolver::{KeywordStore, ResponseStore};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Database location
#[derive(Debug, Clone)]
pub enum DbLocation {
    /// System mode: /var/lib/faq/faq.db
    System,
    /// User mode: $XDG_DATA_HOME/faq/faq.db or ~/.local/share/faq/faq.db
    User,
    /// Explicit path (config file, CLI flag, tests)
    Custom(PathBuf),
}

impl DbLocation {
    pub fn path(&self) -> Result<PathBuf> {
        match self {
            DbLocation::System => Ok(PathBuf::from("/var/lib/faq/faq.db")),
            DbLocation::User => {
                let base_dir = if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
                    PathBuf::from(xdg_data)
                } else if let Ok(home) = std::env::var("HOME") {
                    PathBuf::from(home).join(".local/share")
                } else {
                    anyhow::bail!("Could not determine user data directory");
                };
                Ok(base_dir.join("faq").join("faq.db"))
            }
            DbLocation::Custom(path) => Ok(path.clone()),
        }
    }
}

/// Intent row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentInfo {
    pub id: i64,
    pub name: String,
}

/// Seed file accepted by `FaqDb::import_seed`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub intents: Vec<SeedIntent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIntent {
    pub name: String,
    #[serde(default)]
    pub responses: Vec<SeedResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Counts of rows written by an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub intents: usize,
    pub responses: usize,
    pub keywords: usize,
}

/// Single SQLite connection behind a mutex
pub struct FaqDb {
    conn: Arc<Mutex<Connection>>,
    location: DbLocation,
}

impl FaqDb {
    /// Open or create the database and its schema
    pub fn open(location: DbLocation) -> Result<Self> {
        let db_path = location.path()?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        info!("Opening FAQ database at: {}", db_path.display());

        let conn = Connection::open(&db_path).context("Failed to open SQLite database")?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to enable WAL mode")?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Open the database at an explicit path
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(DbLocation::Custom(path.as_ref().to_path_buf()))
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS intents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                intent_name TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                intent_id INTEGER NOT NULL REFERENCES intents(id),
                response_text TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_responses_intent
             ON responses(intent_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS keywords_responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT NOT NULL,
                intent_id INTEGER NOT NULL REFERENCES intents(id),
                response_id INTEGER NOT NULL REFERENCES responses(id)
            )",
            [],
        )?;

        debug!("FAQ schema ready");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, FaqError> {
        self.conn
            .lock()
            .map_err(|_| FaqError::StoreUnavailable("database connection poisoned".to_string()))
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// Intents keyed by id, as `{id, name}` rows
    pub fn list_intents(&self) -> Result<Vec<IntentInfo>, FaqError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, intent_name FROM intents ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(IntentInfo {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn keyword_count(&self) -> Result<usize, FaqError> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM keywords_responses", [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }

    /// Insert an intent, or return the id of the existing one with that name
    pub fn add_intent(&self, name: &str) -> Result<i64, FaqError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO intents (intent_name) VALUES (?1)",
            params![name],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM intents WHERE intent_name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn add_response(&self, intent_id: i64, text: &str) -> Result<i64, FaqError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO responses (intent_id, response_text) VALUES (?1, ?2)",
            params![intent_id, text],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn add_keyword(&self, keyword: &str, intent_id: i64, response_id: i64) -> Result<i64, FaqError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO keywords_responses (keyword, intent_id, response_id) VALUES (?1, ?2, ?3)",
            params![keyword, intent_id, response_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Write every intent, response and keyword of a seed file
    pub fn import_seed(&self, seed: &SeedFile) -> Result<ImportSummary, FaqError> {
        let mut summary = ImportSummary::default();

        for intent in &seed.intents {
            let intent_id = self.add_intent(&intent.name)?;
            summary.intents += 1;

            for response in &intent.responses {
                let response_id = self.add_response(intent_id, &response.text)?;
                summary.responses += 1;

                for keyword in &response.keywords {
                    self.add_keyword(keyword, intent_id, response_id)?;
                    summary.keywords += 1;
                }
            }
        }

        info!(
            "Imported {} intents, {} responses, {} keywords",
            summary.intents, summary.responses, summary.keywords
        );
        Ok(summary)
    }
}

impl KeywordStore for FaqDb {
    fn load_keywords(&self) -> Result<Vec<KeywordRecord>, FaqError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT keyword, intent_id, response_id FROM keywords_responses ORDER BY id",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(KeywordRecord {
                    keyword: row.get(0)?,
                    intent_id: row.get(1)?,
                    response_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl ResponseStore for FaqDb {
    fn response_text(&self, intent_id: i64, response_id: i64) -> Result<Option<String>, FaqError> {
        let conn = self.lock()?;
        let text = conn
            .query_row(
                "SELECT response_text FROM responses WHERE intent_id = ?1 AND id = ?2",
                params![intent_id, response_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_temp() -> (tempfile::TempDir, FaqDb) {
        let temp_dir = tempdir().unwrap();
        let db = FaqDb::open_path(temp_dir.path().join("faq.db")).unwrap();
        (temp_dir, db)
    }

    #[test]
    fn test_db_creation() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("faq.db");
        let db = FaqDb::open(DbLocation::Custom(db_path.clone())).unwrap();

        assert!(db_path.exists());
        assert!(db.list_intents().unwrap().is_empty());
        assert_eq!(db.keyword_count().unwrap(), 0);
    }

    #[test]
    fn test_keywords_in_insertion_order() {
        let (_dir, db) = open_temp();
        let intent = db.add_intent("returns").unwrap();
        let response = db.add_response(intent, "30 days.").unwrap();
        db.add_keyword("return", intent, response).unwrap();
        db.add_keyword("return policy", intent, response).unwrap();

        let keywords: Vec<String> = db
            .load_keywords()
            .unwrap()
            .into_iter()
            .map(|k| k.keyword)
            .collect();
        assert_eq!(keywords, vec!["return", "return policy"]);
    }

    #[test]
    fn test_response_lookup_requires_both_ids() {
        let (_dir, db) = open_temp();
        let returns = db.add_intent("returns").unwrap();
        let hours = db.add_intent("hours").unwrap();
        let response = db.add_response(returns, "30 days.").unwrap();

        assert_eq!(
            db.response_text(returns, response).unwrap(),
            Some("30 days.".to_string())
        );
        assert_eq!(db.response_text(hours, response).unwrap(), None);
        assert_eq!(db.response_text(returns, response + 100).unwrap(), None);
    }

    #[test]
    fn test_add_intent_is_idempotent() {
        let (_dir, db) = open_temp();
        let first = db.add_intent("fees").unwrap();
        let second = db.add_intent("fees").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.list_intents().unwrap().len(), 1);
    }

    #[test]
    fn test_import_seed() {
        let (_dir, db) = open_temp();
        let seed: SeedFile = serde_json::from_str(
            r#"{
                "intents": [
                    {"name": "returns", "responses": [
                        {"text": "Returns are accepted within 30 days.",
                         "keywords": ["return policy", "return"]}
                    ]},
                    {"name": "hours", "responses": [
                        {"text": "We open at 8am.", "keywords": ["opening hours"]}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let summary = db.import_seed(&seed).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                intents: 2,
                responses: 2,
                keywords: 3
            }
        );
        assert_eq!(db.keyword_count().unwrap(), 3);

        let intents = db.list_intents().unwrap();
        assert_eq!(intents[0].name, "returns");
        assert_eq!(intents[1].name, "hours");
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("faq.db");
        {
            let db = FaqDb::open_path(&path).unwrap();
            db.add_intent("fees").unwrap();
        }
        let db = FaqDb::open_path(&path).unwrap();
        assert_eq!(db.list_intents().unwrap().len(), 1);
    }
}

//! Configuration management.
//!
//! Loads settings from /etc/faq/config.toml (or $FAQ_CONFIG) or uses defaults.
//! The config is read once at startup and handed to collaborators;
//! nothing reads it globally.

use crate::matcher::{Matcher, DEFAULT_FUZZY_THRESHOLD};
use crate::normalize::{LexiconSegmenter, Normalizer, WhitespaceSegmenter};
use crate::oracle::LlmConfig;
use crate::store::DbLocation;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/faq/config.toml";

/// Fallback config file path
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/faq/config.toml";

/// Environment override for the config path
pub const CONFIG_ENV: &str = "FAQ_CONFIG";

/// HTTP gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:7870".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Keyword/response database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("/var/lib/faq/faq.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    pub fn location(&self) -> DbLocation {
        DbLocation::Custom(self.path.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum token-set score (0-100, inclusive) for a fuzzy match
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u32,
}

fn default_fuzzy_threshold() -> u32 {
    DEFAULT_FUZZY_THRESHOLD
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SegmenterKind {
    #[default]
    Whitespace,
    Lexicon,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub segmenter: SegmenterKind,

    /// Multi-syllable words for the lexicon segmenter (e.g. "sinh viên")
    #[serde(default)]
    pub lexicon: Vec<String>,

    /// Extra lexicon file, one compound word per line
    #[serde(default)]
    pub lexicon_file: Option<PathBuf>,
}

/// User-facing fixed messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Returned with HTTP 400 for a blank question
    #[serde(default = "default_invalid_question")]
    pub invalid_question: String,

    /// Returned when the fallback oracle fails
    #[serde(default = "default_oracle_apology")]
    pub oracle_apology: String,
}

fn default_invalid_question() -> String {
    "Vui lòng nhập câu hỏi hợp lệ.".to_string()
}

fn default_oracle_apology() -> String {
    "Xin lỗi, tôi không thể trả lời câu hỏi của bạn vào lúc này.".to_string()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            invalid_question: default_invalid_question(),
            oracle_apology: default_oracle_apology(),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub matcher: MatcherConfig,

    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub messages: MessagesConfig,
}

impl FaqConfig {
    /// Load config from $FAQ_CONFIG or the standard paths, or return defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            match Self::load_from_path(&path) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to load {} from ${}: {}", path, CONFIG_ENV, e),
            }
        }

        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                FaqConfig::default()
            })
    }

    /// Load config from a specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: FaqConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the default config (for first-time setup)
    pub fn save_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&FaqConfig::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path.display());
        Ok(())
    }

    /// Normalizer with the configured segmenter
    pub fn build_normalizer(&self) -> Result<Normalizer> {
        match self.normalizer.segmenter {
            SegmenterKind::Whitespace => Ok(Normalizer::new(Arc::new(WhitespaceSegmenter))),
            SegmenterKind::Lexicon => {
                let mut words = self.normalizer.lexicon.clone();
                if let Some(file) = &self.normalizer.lexicon_file {
                    let content = fs::read_to_string(file)?;
                    words.extend(
                        content
                            .lines()
                            .map(str::trim)
                            .filter(|l| !l.is_empty() && !l.starts_with('#'))
                            .map(str::to_string),
                    );
                }
                let segmenter = LexiconSegmenter::new(words);
                info!("Lexicon segmenter loaded with {} compound words", segmenter.len());
                Ok(Normalizer::new(Arc::new(segmenter)))
            }
        }
    }

    pub fn build_matcher(&self) -> Matcher {
        if self.matcher.fuzzy_threshold > 100 {
            warn!(
                "fuzzy_threshold {} exceeds 100, fuzzy matching can never succeed",
                self.matcher.fuzzy_threshold
            );
        }
        Matcher::new(self.matcher.fuzzy_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::LlmMode;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = FaqConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:7870");
        assert_eq!(config.matcher.fuzzy_threshold, 85);
        assert_eq!(config.normalizer.segmenter, SegmenterKind::Whitespace);
        assert!(!config.llm.is_usable());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
bind_addr = "0.0.0.0:8080"

[matcher]
fuzzy_threshold = 90

[normalizer]
segmenter = "lexicon"
lexicon = ["sinh viên", "học phí"]

[llm]
mode = "local"
base_url = "http://localhost:11434/v1"
model = "llama3"
"#;
        let config: FaqConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.build_matcher().threshold(), 90);
        assert_eq!(config.normalizer.segmenter, SegmenterKind::Lexicon);
        assert_eq!(config.llm.mode, LlmMode::Local);
        // Defaults for missing sections
        assert_eq!(config.database.path, PathBuf::from("/var/lib/faq/faq.db"));
        assert_eq!(config.messages.invalid_question, "Vui lòng nhập câu hỏi hợp lệ.");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FaqConfig = toml::from_str("").unwrap();
        assert_eq!(config.matcher.fuzzy_threshold, 85);
    }

    #[test]
    fn test_lexicon_normalizer() {
        let mut config = FaqConfig::default();
        config.normalizer.segmenter = SegmenterKind::Lexicon;
        config.normalizer.lexicon = vec!["học phí".to_string()];

        let normalizer = config.build_normalizer().unwrap();
        let text = normalizer.normalize("Học phí bao nhiêu?");
        assert_eq!(text.tokens()[0], "học phí");
    }

    #[test]
    fn test_lexicon_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("lexicon.txt");
        fs::write(&file, "# compounds\nsinh viên\n\nký túc xá\n").unwrap();

        let mut config = FaqConfig::default();
        config.normalizer.segmenter = SegmenterKind::Lexicon;
        config.normalizer.lexicon_file = Some(file);

        let normalizer = config.build_normalizer().unwrap();
        let text = normalizer.normalize("ký túc xá cho sinh viên");
        assert_eq!(text.tokens(), &["ký túc xá", "cho", "sinh viên"]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("faq").join("config.toml");
        FaqConfig::save_default(&path).unwrap();

        let loaded = FaqConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded.server.bind_addr, FaqConfig::default().server.bind_addr);
        assert_eq!(loaded.matcher.fuzzy_threshold, 85);
    }
}

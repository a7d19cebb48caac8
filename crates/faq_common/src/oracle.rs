//! Generative fallback oracle
//!
//! Answers questions that no keyword resolves, through an
//! OpenAI-compatible chat completion API.
//!
//! - Disabled by default; no network calls unless configured
//! - API keys are read from an environment variable, never from the config file
//! - Failures are returned as `LlmError`; callers substitute an apology

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

/// LLM operational mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmMode {
    /// LLM is not configured yet
    #[default]
    NotConfigured,

    /// Local server (Ollama, llama.cpp, ...)
    Local,

    /// Remote API; requires an API key
    Remote,

    /// Explicitly disabled
    Disabled,
}

/// LLM configuration (`[llm]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub mode: LlmMode,

    /// Base URL, e.g. "http://localhost:11434/v1" or "https://api.openai.com/v1"
    #[serde(default)]
    pub base_url: Option<String>,

    /// Environment variable holding the API key (e.g. "OPENAI_API_KEY")
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Model name (e.g. "gpt-3.5-turbo", "llama3")
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System message sent with every question
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Context prepended to the question, e.g. the organization name
    #[serde(default)]
    pub question_prefix: Option<String>,
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_system_prompt() -> String {
    "Bạn là một chatbot hỗ trợ người dùng.".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            mode: LlmMode::NotConfigured,
            base_url: None,
            api_key_env: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
            question_prefix: None,
        }
    }
}

impl LlmConfig {
    /// Local server configuration (no API key)
    pub fn local(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            mode: LlmMode::Local,
            base_url: Some(base_url.into()),
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Remote OpenAI-compatible configuration
    pub fn remote(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            mode: LlmMode::Remote,
            base_url: Some(base_url.into()),
            api_key_env: Some(api_key_env.into()),
            model: Some(model.into()),
            ..Default::default()
        }
    }

    pub fn disabled() -> Self {
        Self {
            mode: LlmMode::Disabled,
            ..Default::default()
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.mode, LlmMode::Local | LlmMode::Remote)
    }
}

/// Chat prompt
#[derive(Debug, Clone)]
pub struct LlmPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM backend is disabled")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Chat completion backend
pub trait LlmBackend: Send + Sync {
    fn chat(&self, prompt: &LlmPrompt) -> Result<LlmResponse, LlmError>;
}

/// Always disabled
pub struct DummyBackend;

impl LlmBackend for DummyBackend {
    fn chat(&self, _prompt: &LlmPrompt) -> Result<LlmResponse, LlmError> {
        Err(LlmError::Disabled)
    }
}

/// OpenAI-compatible HTTP backend (local or remote)
pub struct HttpOpenAiBackend {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl HttpOpenAiBackend {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config
            .base_url
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| LlmError::ConfigError("base_url is required for HTTP backend".to_string()))?;

        let model = config
            .model
            .clone()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| LlmError::ConfigError("model is required for HTTP backend".to_string()))?;

        let is_local = config.mode == LlmMode::Local;

        let api_key = match &config.api_key_env {
            Some(env_var) => match env::var(env_var) {
                Ok(key) if !key.is_empty() => Some(key),
                // Local servers don't need API keys
                _ if is_local => None,
                Ok(_) => {
                    return Err(LlmError::ConfigError(format!("API key env var {} is empty", env_var)))
                }
                Err(_) => {
                    return Err(LlmError::ConfigError(format!("API key env var {} not found", env_var)))
                }
            },
            None if is_local => None,
            None => {
                return Err(LlmError::ConfigError(
                    "API key env var required for remote backend".to_string(),
                ))
            }
        };

        Ok(Self {
            base_url,
            api_key,
            model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

impl LlmBackend for HttpOpenAiBackend {
    fn chat(&self, prompt: &LlmPrompt) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        // Blocking client: callers run this off the async executor
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to build HTTP client: {}", e)))?;

        let mut req = client.post(&url).header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req
            .json(&request_body)
            .send()
            .map_err(|e| LlmError::HttpError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(LlmError::HttpError(format!("HTTP {}: {}", status, body)));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::HttpError(format!("Failed to parse response: {}", e)))?;

        extract_content(&response_json).map(|text| LlmResponse { text })
    }
}

/// Text of the first choice, trimmed
fn extract_content(response: &serde_json::Value) -> Result<String, LlmError> {
    let text = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::Unexpected("No content in response".to_string()))?
        .trim()
        .to_string();

    if text.is_empty() {
        return Err(LlmError::Unexpected("Empty content in response".to_string()));
    }
    Ok(text)
}

/// Answers questions no keyword resolved
pub trait FallbackOracle: Send + Sync {
    fn complete(&self, question: &str) -> Result<String, LlmError>;
}

/// Prompt building on top of an `LlmBackend`
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
    system_prompt: String,
    question_prefix: Option<String>,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        if !config.is_usable() {
            return Err(LlmError::Disabled);
        }

        Ok(Self::with_backend(
            Box::new(HttpOpenAiBackend::new(config)?),
            config,
        ))
    }

    pub fn with_backend(backend: Box<dyn LlmBackend>, config: &LlmConfig) -> Self {
        Self {
            backend,
            system_prompt: config.system_prompt.clone(),
            question_prefix: config.question_prefix.clone(),
        }
    }

    /// Client whose every call fails with `LlmError::Disabled`
    pub fn disabled() -> Self {
        Self::with_backend(Box::new(DummyBackend), &LlmConfig::disabled())
    }

    pub fn prompt_for(&self, question: &str) -> LlmPrompt {
        let user = match &self.question_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{} {}", prefix, question),
            _ => question.to_string(),
        };
        LlmPrompt {
            system: self.system_prompt.clone(),
            user,
        }
    }
}

impl FallbackOracle for LlmClient {
    fn complete(&self, question: &str) -> Result<String, LlmError> {
        let prompt = self.prompt_for(question);
        debug!("Calling fallback oracle ({} bytes)", prompt.user.len());
        self.backend.chat(&prompt).map(|r| r.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoBackend;

    impl LlmBackend for EchoBackend {
        fn chat(&self, prompt: &LlmPrompt) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                text: format!("{}|{}", prompt.system, prompt.user),
            })
        }
    }

    #[test]
    fn test_default_config_is_not_usable() {
        let config = LlmConfig::default();
        assert_eq!(config.mode, LlmMode::NotConfigured);
        assert!(!config.is_usable());
        assert_eq!(config.max_tokens, 300);
    }

    #[test]
    fn test_dummy_backend_returns_disabled() {
        let prompt = LlmPrompt {
            system: "test".to_string(),
            user: "hello".to_string(),
        };
        assert!(matches!(DummyBackend.chat(&prompt), Err(LlmError::Disabled)));
    }

    #[test]
    fn test_client_from_disabled_config() {
        assert!(matches!(
            LlmClient::from_config(&LlmConfig::disabled()),
            Err(LlmError::Disabled)
        ));
        assert!(matches!(
            LlmClient::disabled().complete("hi"),
            Err(LlmError::Disabled)
        ));
    }

    #[test]
    fn test_http_backend_requires_base_url() {
        let mut config = LlmConfig::local("", "test-model");
        config.base_url = None;
        assert!(matches!(
            HttpOpenAiBackend::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_http_backend_requires_model() {
        let mut config = LlmConfig::local("http://localhost:8080/v1", "");
        config.model = None;
        assert!(matches!(
            HttpOpenAiBackend::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_remote_requires_api_key() {
        let config = LlmConfig::remote(
            "https://api.openai.com/v1",
            "gpt-3.5-turbo",
            "FAQ_TEST_KEY_THAT_IS_NEVER_SET",
        );
        assert!(matches!(
            HttpOpenAiBackend::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_local_backend_without_key() {
        let config = LlmConfig::local("http://localhost:11434/v1", "llama3");
        assert!(HttpOpenAiBackend::new(&config).is_ok());
    }

    #[test]
    fn test_prompt_prefix() {
        let mut config = LlmConfig::local("http://localhost:11434/v1", "llama3");
        config.question_prefix = Some("[UNETI]".to_string());
        config.system_prompt = "sys".to_string();

        let client = LlmClient::with_backend(Box::new(EchoBackend), &config);
        assert_eq!(client.complete("học phí?").unwrap(), "sys|[UNETI] học phí?");
    }

    #[test]
    fn test_extract_content() {
        let ok = serde_json::json!({"choices": [{"message": {"content": "  Xin chào \n"}}]});
        assert_eq!(extract_content(&ok).unwrap(), "Xin chào");

        let missing = serde_json::json!({"choices": []});
        assert!(matches!(extract_content(&missing), Err(LlmError::Unexpected(_))));

        let blank = serde_json::json!({"choices": [{"message": {"content": "   "}}]});
        assert!(matches!(extract_content(&blank), Err(LlmError::Unexpected(_))));
    }

    #[test]
    fn test_parse_mode_from_toml() {
        let config: LlmConfig = toml::from_str(
            r#"
mode = "remote"
base_url = "https://api.openai.com/v1"
model = "gpt-3.5-turbo"
api_key_env = "OPENAI_API_KEY"
"#,
        )
        .unwrap();
        assert_eq!(config.mode, LlmMode::Remote);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.timeout_secs, 15);
    }
}

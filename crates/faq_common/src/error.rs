//! Error types for the FAQ service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaqError {
    #[error("Question is empty")]
    InvalidInput,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Fallback oracle error: {0}")]
    Oracle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FaqError {
    pub fn code(&self) -> i32 {
        match self {
            FaqError::InvalidInput => -32602,
            FaqError::StoreUnavailable(_) => -32001,
            FaqError::Oracle(_) => -32002,
            FaqError::Config(_) => -32003,
            FaqError::Io(_) => -32006,
            FaqError::Json(_) => -32700,
        }
    }

    /// Whether the caller is at fault (as opposed to a backend failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, FaqError::InvalidInput)
    }
}

impl From<rusqlite::Error> for FaqError {
    fn from(e: rusqlite::Error) -> Self {
        FaqError::StoreUnavailable(e.to_string())
    }
}

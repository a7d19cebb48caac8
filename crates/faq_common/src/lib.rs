//! FAQ Common - intent resolution engine and shared collaborators
//!
//! Resolves a free-text question to a stored (intent, response) pair.
//! Unresolved questions are answered by the generative fallback oracle.

pub mod config;
pub mod error;
pub mod keyword_index;
pub mod matcher;
pub mod normalize;
pub mod oracle;
pub mod resolver;
pub mod similarity;
pub mod store;

pub use config::FaqConfig;
pub use error::FaqError;
pub use keyword_index::{KeywordIndex, KeywordRecord};
pub use matcher::{Matcher, ResolutionResult, DEFAULT_FUZZY_THRESHOLD};
pub use normalize::{NormalizedText, Normalizer, Segmenter};
pub use resolver::{KeywordStore, Resolver, ResponseStore};
pub use similarity::{token_set_ratio, word_overlap, WordOverlap};

/// Crate version reported by the daemon and CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

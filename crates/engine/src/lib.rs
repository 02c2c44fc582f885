//! GiftWise conversation engine
//!
//! Features:
//! - Guided multiple-choice dialogue with a free-text fallback
//! - Rule-based persona classification over recorded answers
//! - Keyword/pattern persona detection for typed text
//! - Suggestions turns backed by the recommendation collaborator
//! - Session metrics and pluggable conversation storage

pub mod classifier;
pub mod controller;
pub mod history;
pub mod metrics;
pub mod session;
pub mod store;

pub use classifier::{FreeTextDetector, RuleClassifier};
pub use controller::{ChatEngine, EngineConfig, EngineEvent, EngineState, PersonaState};
pub use history::ConversationHistory;
pub use metrics::MetricsTracker;
pub use session::Session;
pub use store::{InMemorySessionStore, SessionStore, StoredConversation};

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] giftwise_config::ConfigError),

    #[error("recommendation error: {0}")]
    Recommend(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error("recommendation fetch timed out")]
    Timeout,
}

impl From<giftwise_recommend::RecommendError> for EngineError {
    fn from(err: giftwise_recommend::RecommendError) -> Self {
        match err {
            giftwise_recommend::RecommendError::Timeout => EngineError::Timeout,
            other => EngineError::Recommend(other.to_string()),
        }
    }
}

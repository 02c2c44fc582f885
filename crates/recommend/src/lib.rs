//! Recommendation and affiliate collaborators for GiftWise
//!
//! Features:
//! - `Recommender` trait consumed by the conversation engine
//! - Catalog-backed recommendations with budget and keyword filtering
//! - Optional LLM-backed preference analysis with total fallback
//! - Affiliate link building and fire-and-forget telemetry

pub mod affiliate;
pub mod analysis;
pub mod catalog;
pub mod recommender;

pub use affiliate::AffiliateLinks;
pub use analysis::{PreferenceAnalyzer, PreferenceProfile, SmartRecommender};
pub use catalog::Catalog;
pub use recommender::{fallback_products, CatalogRecommender, Recommender};

use thiserror::Error;

/// Recommendation collaborator errors
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("recommendation fetch failed: {0}")]
    Fetch(String),

    #[error("preference analysis failed: {0}")]
    Analysis(String),

    #[error("invalid product link: {0}")]
    InvalidLink(String),

    #[error("recommendation fetch timed out")]
    Timeout,
}

impl From<reqwest::Error> for RecommendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RecommendError::Timeout
        } else {
            RecommendError::Fetch(err.to_string())
        }
    }
}

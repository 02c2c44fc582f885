//! Preference analysis
//!
//! Optional "smart" recommendation path: the answer map is posted to an
//! external analysis service (a thin LLM proxy) that returns interests,
//! a price range, and search keywords. Any failure falls back to the plain
//! catalog lookup, so this path can never break a suggestions turn.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use giftwise_config::{AnalysisSettings, AnswerMap};
use giftwise_core::{BudgetTier, Product};

use crate::recommender::{CatalogRecommender, Recommender};
use crate::RecommendError;

/// Structured result of the analysis service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub gift_category: Option<String>,
    #[serde(default)]
    pub occasion_context: Option<String>,
}

impl PreferenceProfile {
    /// Map the textual price range onto a budget tier
    pub fn budget_tier(&self) -> Option<BudgetTier> {
        match self.price_range.as_deref() {
            Some("low") => Some(BudgetTier::Low),
            Some("medium") => Some(BudgetTier::Medium),
            Some("high") => Some(BudgetTier::High),
            Some("premium") => Some(BudgetTier::Premium),
            _ => None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisRequest<'a> {
    chat_history: &'a AnswerMap,
}

/// Client for the preference-analysis service
pub struct PreferenceAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl PreferenceAnalyzer {
    /// Build an analyzer from settings; `None` when no endpoint is configured
    pub fn from_settings(settings: &AnalysisSettings) -> Option<Self> {
        settings.endpoint.as_ref().map(|endpoint| Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }

    /// Analyze the answers recorded so far
    pub async fn analyze(&self, answers: &AnswerMap) -> Result<PreferenceProfile, RecommendError> {
        let request = AnalysisRequest { chat_history: answers };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| RecommendError::Analysis(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RecommendError::Analysis(format!(
                "analysis service returned {}",
                response.status()
            )));
        }

        response
            .json::<PreferenceProfile>()
            .await
            .map_err(|e| RecommendError::Analysis(e.to_string()))
    }
}

/// Recommender that enriches catalog lookups with remote preference analysis
///
/// The analyzer needs the full answer map while the `Recommender` contract
/// only carries interests and budget; the engine hands the map over before
/// each suggestions turn.
pub struct SmartRecommender {
    analyzer: Option<PreferenceAnalyzer>,
    inner: CatalogRecommender,
    answers: RwLock<AnswerMap>,
}

impl SmartRecommender {
    pub fn new(analyzer: Option<PreferenceAnalyzer>, inner: CatalogRecommender) -> Self {
        Self {
            analyzer,
            inner,
            answers: RwLock::new(AnswerMap::new()),
        }
    }

    /// Provide the current answer map for the next analysis call
    pub fn set_answers(&self, answers: AnswerMap) {
        *self.answers.write() = answers;
    }
}

#[async_trait]
impl Recommender for SmartRecommender {
    fn observe_answers(&self, answers: &AnswerMap) {
        self.set_answers(answers.clone());
    }

    async fn recommend(
        &self,
        interests: &[String],
        budget: Option<BudgetTier>,
    ) -> Result<Vec<Product>, RecommendError> {
        if let Some(analyzer) = &self.analyzer {
            let answers = self.answers.read().clone();
            match analyzer.analyze(&answers).await {
                Ok(profile) => {
                    let interests = if profile.interests.is_empty() {
                        interests.to_vec()
                    } else {
                        profile.interests.clone()
                    };
                    let budget = profile.budget_tier().or(budget);
                    let keywords = profile.keywords.clone();

                    let products =
                        self.inner
                            .catalog()
                            .find(&interests, budget, Some(&keywords));
                    tracing::debug!(
                        interests = ?interests,
                        keywords = ?keywords,
                        count = products.len(),
                        "Smart recommendation"
                    );
                    return Ok(products);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Preference analysis failed, using catalog directly");
                }
            }
        }

        self.inner.recommend(interests, budget).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_budget_mapping() {
        let profile = PreferenceProfile {
            interests: vec![],
            price_range: Some("medium".to_string()),
            keywords: vec![],
            gift_category: None,
            occasion_context: None,
        };
        assert_eq!(profile.budget_tier(), Some(BudgetTier::Medium));

        let profile = PreferenceProfile {
            price_range: Some("whatever".to_string()),
            ..profile
        };
        assert_eq!(profile.budget_tier(), None);
    }

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let profile: PreferenceProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.interests.is_empty());
        assert!(profile.budget_tier().is_none());
    }

    #[test]
    fn test_analyzer_disabled_without_endpoint() {
        let settings = AnalysisSettings::default();
        assert!(PreferenceAnalyzer::from_settings(&settings).is_none());
    }

    #[tokio::test]
    async fn test_smart_recommender_without_analyzer() {
        let recommender = SmartRecommender::new(None, CatalogRecommender::instant());
        let products = recommender
            .recommend(&["cooking".to_string()], None)
            .await
            .unwrap();

        assert!(!products.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_analyzer_falls_back() {
        let settings = AnalysisSettings {
            endpoint: Some("http://127.0.0.1:1/analyze".to_string()),
            timeout_secs: 1,
        };
        let analyzer = PreferenceAnalyzer::from_settings(&settings).unwrap();
        let recommender = SmartRecommender::new(Some(analyzer), CatalogRecommender::instant());

        let mut answers = AnswerMap::new();
        answers.insert(giftwise_config::StepId::Interests, "tech".to_string());
        recommender.observe_answers(&answers);

        let products = recommender
            .recommend(&["tech".to_string()], None)
            .await
            .unwrap();

        assert!(!products.is_empty());
    }
}

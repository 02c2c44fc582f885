//! Recommendation collaborator
//!
//! The engine only sees the `Recommender` trait; the catalog-backed
//! implementation simulates remote latency so the conversation pacing
//! matches a real fetch.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use giftwise_config::AnswerMap;
use giftwise_core::{BudgetTier, Platform, Product};

use crate::catalog::Catalog;
use crate::RecommendError;

/// Source of product suggestions
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Offer the full answer map ahead of a fetch. Implementations that only
    /// need interests and budget ignore it.
    fn observe_answers(&self, _answers: &AnswerMap) {}

    /// Fetch products for the given interests and budget band
    async fn recommend(
        &self,
        interests: &[String],
        budget: Option<BudgetTier>,
    ) -> Result<Vec<Product>, RecommendError>;
}

/// Catalog-backed recommender with simulated fetch latency
pub struct CatalogRecommender {
    catalog: Catalog,
    /// Simulated latency bounds in milliseconds; `None` responds immediately
    latency_ms: Option<(u64, u64)>,
}

impl CatalogRecommender {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            latency_ms: Some((600, 1400)),
        }
    }

    /// Recommender with no simulated latency, for tests
    pub fn instant() -> Self {
        Self {
            catalog: Catalog::default(),
            latency_ms: None,
        }
    }

    /// Override the simulated latency bounds
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.latency_ms = Some((min_ms, max_ms.max(min_ms)));
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    async fn simulate_latency(&self) {
        if let Some((min_ms, max_ms)) = self.latency_ms {
            let delay = if max_ms > min_ms {
                rand::thread_rng().gen_range(min_ms..=max_ms)
            } else {
                min_ms
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

impl Default for CatalogRecommender {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

#[async_trait]
impl Recommender for CatalogRecommender {
    async fn recommend(
        &self,
        interests: &[String],
        budget: Option<BudgetTier>,
    ) -> Result<Vec<Product>, RecommendError> {
        self.simulate_latency().await;

        let products = self.catalog.find(interests, budget, None);
        tracing::debug!(
            interests = ?interests,
            budget = ?budget,
            count = products.len(),
            "Catalog recommendation"
        );

        Ok(products)
    }
}

/// Fixed product list used when the recommendation collaborator fails
pub fn fallback_products() -> Vec<Product> {
    vec![
        Product {
            id: "fallback-1".to_string(),
            title: "Scented Candle Gift Set".to_string(),
            price: "$34.99".to_string(),
            image: None,
            description: "Luxury set of 4 hand-poured soy candles in seasonal scents, beautifully packaged.".to_string(),
            link: "https://amazon.com/product/general-1".to_string(),
            platform: Platform::Amazon,
        },
        Product {
            id: "fallback-2".to_string(),
            title: "Personalized Photo Frame".to_string(),
            price: "$29.99".to_string(),
            image: None,
            description: "Custom engraved wooden frame with your choice of message and design.".to_string(),
            link: "https://etsy.com/product/general-2".to_string(),
            platform: Platform::Etsy,
        },
        Product {
            id: "fallback-3".to_string(),
            title: "Gourmet Chocolate Box".to_string(),
            price: "$39.95".to_string(),
            image: None,
            description: "Assortment of 24 handcrafted artisan chocolates in an elegant gift box.".to_string(),
            link: "https://amazon.com/product/general-3".to_string(),
            platform: Platform::Amazon,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instant_recommender() {
        let recommender = CatalogRecommender::instant();
        let products = recommender
            .recommend(&["tech".to_string()], None)
            .await
            .unwrap();

        assert!(!products.is_empty());
    }

    #[tokio::test]
    async fn test_budget_respected() {
        let recommender = CatalogRecommender::instant();
        let products = recommender
            .recommend(&["gardening".to_string()], Some(BudgetTier::Medium))
            .await
            .unwrap();

        for p in &products {
            assert!(BudgetTier::Medium.contains(p.price_value().unwrap()));
        }
    }

    #[test]
    fn test_fallback_products_are_nonempty() {
        let products = fallback_products();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.price_value().is_some()));
    }
}

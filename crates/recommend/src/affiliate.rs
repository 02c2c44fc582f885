//! Affiliate link building and telemetry
//!
//! Outbound product links get the partner tracking parameters appended per
//! marketplace. Impression/click/conversion events are fire-and-forget: they
//! are posted on a spawned task and failures are logged, never propagated.

use chrono::Utc;
use reqwest::Url;
use uuid::Uuid;

use giftwise_config::AffiliateConfig;
use giftwise_core::{Platform, Product};

use crate::RecommendError;

/// Affiliate link builder and telemetry sink
pub struct AffiliateLinks {
    config: AffiliateConfig,
    client: reqwest::Client,
    /// Attribution session id, stable for the collaborator's lifetime
    session_id: String,
}

impl AffiliateLinks {
    pub fn new(config: AffiliateConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Build the trackable outbound URL for a product
    pub fn tracked_link(&self, product: &Product) -> Result<String, RecommendError> {
        let mut url = Url::parse(&product.link)
            .map_err(|e| RecommendError::InvalidLink(format!("{}: {e}", product.link)))?;

        match product.platform {
            Platform::Amazon => {
                url.query_pairs_mut()
                    .append_pair("tag", &self.config.tracking_ids.amazon);
            }
            Platform::Etsy => {
                url.query_pairs_mut()
                    .append_pair("utm_source", "giftwise")
                    .append_pair("utm_medium", "affiliate")
                    .append_pair("utm_campaign", &self.config.tracking_ids.etsy);
            }
        }

        Ok(url.into())
    }

    /// Record that a set of products was shown
    pub fn record_impression(&self, products: &[Product]) {
        tracing::debug!(count = products.len(), "Product impression");

        for product in products {
            let payload = self.event_payload(product);
            self.post_event(self.config.endpoints.impression.clone(), payload);
        }
    }

    /// Record a click on a product
    pub fn record_click(&self, product: &Product) {
        tracing::debug!(product_id = %product.id, platform = %product.platform, "Product click");

        let payload = self.event_payload(product);
        self.post_event(self.config.endpoints.click.clone(), payload);
    }

    /// Record a conversion reported by an affiliate webhook
    pub fn record_conversion(&self, transaction_id: &str, product_id: &str, value: f64) {
        tracing::debug!(%transaction_id, %product_id, value, "Conversion");

        let payload = serde_json::json!({
            "transactionId": transaction_id,
            "productId": product_id,
            "value": value,
            "timestamp": Utc::now().to_rfc3339(),
            "sessionId": self.session_id,
        });
        self.post_event(self.config.endpoints.conversion.clone(), payload);
    }

    fn event_payload(&self, product: &Product) -> serde_json::Value {
        serde_json::json!({
            "productId": product.id,
            "platform": product.platform,
            "price": product.price,
            "timestamp": Utc::now().to_rfc3339(),
            "sessionId": self.session_id,
            "url": self.tracked_link(product).unwrap_or_else(|_| product.link.clone()),
        })
    }

    fn post_event(&self, endpoint: String, payload: serde_json::Value) {
        if self.config.telemetry_disabled {
            return;
        }

        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = client.post(&endpoint).json(&payload).send().await {
                tracing::debug!(error = %e, %endpoint, "Telemetry post failed");
            }
        });
    }
}

impl Default for AffiliateLinks {
    fn default() -> Self {
        Self::new(AffiliateConfig::default())
    }
}

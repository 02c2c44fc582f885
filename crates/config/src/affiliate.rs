//! Affiliate tracking configuration

use serde::{Deserialize, Serialize};

/// Partner tracking ids per marketplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingIds {
    #[serde(default = "default_tracking_id")]
    pub amazon: String,
    #[serde(default = "default_tracking_id")]
    pub etsy: String,
}

fn default_tracking_id() -> String {
    "giftwise-20".to_string()
}

impl Default for TrackingIds {
    fn default() -> Self {
        Self {
            amazon: default_tracking_id(),
            etsy: default_tracking_id(),
        }
    }
}

/// Telemetry endpoint URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEndpoints {
    #[serde(default = "default_impression_endpoint")]
    pub impression: String,
    #[serde(default = "default_click_endpoint")]
    pub click: String,
    #[serde(default = "default_conversion_endpoint")]
    pub conversion: String,
}

fn default_impression_endpoint() -> String {
    "https://api.example.com/track/impression".to_string()
}

fn default_click_endpoint() -> String {
    "https://api.example.com/track/click".to_string()
}

fn default_conversion_endpoint() -> String {
    "https://api.example.com/track/conversion".to_string()
}

impl Default for TelemetryEndpoints {
    fn default() -> Self {
        Self {
            impression: default_impression_endpoint(),
            click: default_click_endpoint(),
            conversion: default_conversion_endpoint(),
        }
    }
}

/// Affiliate link and telemetry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffiliateConfig {
    #[serde(default)]
    pub tracking_ids: TrackingIds,
    #[serde(default)]
    pub endpoints: TelemetryEndpoints,
    /// Disable the fire-and-forget telemetry posts entirely
    #[serde(default)]
    pub telemetry_disabled: bool,
}

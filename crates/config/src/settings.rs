//! Runtime settings
//!
//! Loaded from an optional file plus `GIFTWISE_`-prefixed environment
//! variables (double underscore as section separator, e.g.
//! `GIFTWISE_ENGINE__TYPING_DELAY_MAX_MS=0`).

use serde::{Deserialize, Serialize};

use crate::affiliate::AffiliateConfig;
use crate::ConfigError;

/// Engine pacing and gating knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Lower bound of the simulated typing delay, in milliseconds
    #[serde(default = "default_typing_delay_min_ms")]
    pub typing_delay_min_ms: u64,
    /// Upper bound of the simulated typing delay, in milliseconds
    #[serde(default = "default_typing_delay_max_ms")]
    pub typing_delay_max_ms: u64,
    /// Budget for a recommendation fetch before falling back, in seconds
    #[serde(default = "default_recommendation_timeout_secs")]
    pub recommendation_timeout_secs: u64,
    /// Answers required before the persona classifier runs
    #[serde(default = "default_min_answers_for_persona")]
    pub min_answers_for_persona: usize,
}

fn default_typing_delay_min_ms() -> u64 {
    800
}

fn default_typing_delay_max_ms() -> u64 {
    2000
}

fn default_recommendation_timeout_secs() -> u64 {
    10
}

fn default_min_answers_for_persona() -> usize {
    3
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            typing_delay_min_ms: default_typing_delay_min_ms(),
            typing_delay_max_ms: default_typing_delay_max_ms(),
            recommendation_timeout_secs: default_recommendation_timeout_secs(),
            min_answers_for_persona: default_min_answers_for_persona(),
        }
    }
}

impl EngineSettings {
    /// Settings for tests: no artificial delays
    pub fn instant() -> Self {
        Self {
            typing_delay_min_ms: 0,
            typing_delay_max_ms: 0,
            ..Self::default()
        }
    }
}

/// Preference-analysis collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Endpoint of the preference-analysis service; `None` disables the
    /// smart path and the catalog is used directly
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_analysis_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_analysis_timeout_secs() -> u64 {
    8
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_analysis_timeout_secs(),
        }
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub affiliate: AffiliateConfig,
}

/// Load settings from an optional file and the environment
pub fn load_settings(path: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GIFTWISE").separator("__"),
    );

    let settings: Settings = builder.build()?.try_deserialize()?;

    if settings.engine.typing_delay_min_ms > settings.engine.typing_delay_max_ms {
        return Err(ConfigError::InvalidValue {
            field: "engine.typing_delay_min_ms".to_string(),
            message: "must not exceed typing_delay_max_ms".to_string(),
        });
    }

    tracing::debug!(
        typing_delay_max_ms = settings.engine.typing_delay_max_ms,
        analysis_enabled = settings.analysis.endpoint.is_some(),
        "Settings loaded"
    );

    Ok(settings)
}

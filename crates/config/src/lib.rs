//! Configuration for the GiftWise conversation engine
//!
//! Everything the engine treats as data lives here:
//! - The guided flow graph (steps, choices, targets)
//! - The persona profile rule table
//! - Fallback response templates
//! - Affiliate tracking configuration
//! - A file + environment settings loader (`GIFTWISE_` prefix)
//!
//! Tables ship as `Default` impls on serde types so a config file can
//! override any of them without code changes.

pub mod affiliate;
pub mod flow;
pub mod profiles;
pub mod settings;
pub mod templates;

pub use affiliate::{AffiliateConfig, TelemetryEndpoints, TrackingIds};
pub use flow::{AnswerMap, Choice, ChoiceTarget, FlowConfig, Step, StepId};
pub use profiles::{PersonaProfile, ProfileTable, Rule};
pub use settings::{load_settings, AnalysisSettings, EngineSettings, Settings};
pub use templates::FallbackTemplates;

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required step '{0}'")]
    MissingStep(StepId),

    #[error("invalid flow at step '{step}': {message}")]
    InvalidFlow { step: StepId, message: String },

    #[error("choice '{choice}' at step '{step}' targets unknown step '{target}'")]
    DanglingTarget {
        step: StepId,
        choice: String,
        target: StepId,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

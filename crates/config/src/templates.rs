//! Response templates
//!
//! Fixed assistant copy that is not part of the flow graph.

use serde::{Deserialize, Serialize};

/// Fallback copy used when a collaborator fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackTemplates {
    /// Shown instead of the persona suggestion text when the recommendation
    /// fetch fails; the fixed fallback product list accompanies it
    #[serde(default = "default_recommendation_fallback")]
    pub recommendation_fallback: String,
    /// Neutral retry prompt surfaced as a toast
    #[serde(default = "default_retry_prompt")]
    pub retry_prompt: String,
}

fn default_recommendation_fallback() -> String {
    "I couldn't reach the gift catalog just now, so here are a few reliable \
     favorites to start with:"
        .to_string()
}

fn default_retry_prompt() -> String {
    "Something went wrong on my end. Please try again.".to_string()
}

impl Default for FallbackTemplates {
    fn default() -> Self {
        Self {
            recommendation_fallback: default_recommendation_fallback(),
            retry_prompt: default_retry_prompt(),
        }
    }
}

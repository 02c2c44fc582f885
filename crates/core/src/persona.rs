//! Gift-giver persona definitions
//!
//! A persona captures the shopping style inferred from the user's answers:
//! how urgent the purchase is, whether the emphasis is emotional or
//! practical, and what register the assistant's copy should use. Every
//! consumption site matches exhaustively so adding a persona is a compile
//! error until all surfaces handle it.

use serde::{Deserialize, Serialize};

/// Inferred gift-giver persona
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Efficient shopper who wants quality without research time
    BusyProfessional,
    /// Needs the gift to arrive in days
    LastMinute,
    /// Values emotional connection and shared memories
    Sentimental,
    /// Buying for a colleague, client, or business contact
    Corporate,
    /// Looking for value first
    BudgetConscious,
    /// Not enough signal yet
    #[default]
    Unknown,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::BusyProfessional => "busy_professional",
            Persona::LastMinute => "last_minute",
            Persona::Sentimental => "sentimental",
            Persona::Corporate => "corporate",
            Persona::BudgetConscious => "budget_conscious",
            Persona::Unknown => "unknown",
        }
    }

    /// All personas the classifier can assign (excludes `Unknown`)
    pub fn known() -> [Persona; 5] {
        [
            Persona::BusyProfessional,
            Persona::LastMinute,
            Persona::Sentimental,
            Persona::Corporate,
            Persona::BudgetConscious,
        ]
    }

    /// Whether a concrete persona has been assigned
    pub fn is_known(&self) -> bool {
        !matches!(self, Persona::Unknown)
    }

    /// Lead-in text for the suggestions message
    pub fn suggestion_text(&self) -> &'static str {
        match self {
            Persona::BusyProfessional => {
                "I've selected these efficient options that make a thoughtful \
                 impression without requiring extensive shopping time."
            }
            Persona::LastMinute => {
                "Here are gifts with quick delivery options that still feel \
                 thoughtful and personal."
            }
            Persona::Sentimental => {
                "I've found these meaningful gifts that create a personal \
                 connection and show how much you care. These options are \
                 perfect for expressing deep appreciation and creating \
                 lasting memories."
            }
            Persona::Corporate => {
                "These professional options maintain the right balance \
                 between thoughtfulness and appropriate business boundaries."
            }
            Persona::BudgetConscious => {
                "These creative options offer great value while still making \
                 a meaningful impression."
            }
            Persona::Unknown => "Based on your choices, here are some perfect gift suggestions:",
        }
    }

    /// Longer description shown in persona insight surfaces
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Persona::Sentimental => Some(
                "You seem to value emotional connection and meaningful \
                 gift-giving. I'll focus on gifts that create lasting \
                 memories and express deep appreciation.",
            ),
            Persona::BusyProfessional => Some(
                "I notice you're looking for thoughtful yet efficient gift \
                 options. I'll focus on quality gifts that don't require \
                 extensive research.",
            ),
            Persona::LastMinute => Some(
                "I understand you need a quick solution. I'll prioritize \
                 gifts with fast delivery that still feel personal and \
                 thoughtful.",
            ),
            Persona::Corporate => Some(
                "For professional gift-giving, I'll suggest options that \
                 maintain the right balance of thoughtfulness and business \
                 appropriateness.",
            ),
            Persona::BudgetConscious => Some(
                "I'll help you find creative, meaningful gifts that make a \
                 great impression without breaking the bank.",
            ),
            Persona::Unknown => None,
        }
    }

    /// Acknowledgment after a free-text submission
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            Persona::Sentimental => {
                "Thank you for sharing that meaningful context. I'll ensure \
                 the suggestions reflect the emotional connection you're \
                 looking to express."
            }
            Persona::BusyProfessional => {
                "Got it. I'll use this information to find efficient yet \
                 thoughtful options for you."
            }
            Persona::LastMinute => {
                "Thanks - I'll find you something meaningful that can arrive quickly."
            }
            Persona::Corporate => {
                "I understand the professional context. I'll suggest \
                 appropriate options for your business relationship."
            }
            Persona::BudgetConscious => {
                "Thanks for the details. I'll find options that offer great \
                 value while still being meaningful."
            }
            Persona::Unknown => {
                "Thanks for your additional information. I'll take that into \
                 account with my suggestions."
            }
        }
    }

    /// Icon name for UI badges
    pub fn icon(&self) -> &'static str {
        match self {
            Persona::BusyProfessional => "briefcase",
            Persona::LastMinute => "clock",
            Persona::Sentimental => "heart",
            Persona::Corporate => "building",
            Persona::BudgetConscious => "piggy-bank",
            Persona::Unknown => "sparkles",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(Persona::default(), Persona::Unknown);
        assert!(!Persona::default().is_known());
    }

    #[test]
    fn test_known_excludes_unknown() {
        assert!(Persona::known().iter().all(|p| p.is_known()));
    }

    #[test]
    fn test_unknown_has_no_description() {
        assert!(Persona::Unknown.description().is_none());
        for persona in Persona::known() {
            assert!(persona.description().is_some());
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Persona::BusyProfessional).unwrap();
        assert_eq!(json, "\"busy_professional\"");
        let back: Persona = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Persona::BusyProfessional);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }
}

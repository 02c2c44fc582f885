//! Chat transcript types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::product::Product;

/// Author of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message typed or selected by the gift giver
    User,
    /// Message produced by the assistant
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A selectable choice attached to an assistant message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChoice {
    /// Choice id, unique within the step that produced the message
    pub id: String,
    /// Display label
    pub text: String,
}

impl MessageChoice {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A single message in the conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id
    pub id: Uuid,
    /// Who said it
    pub role: MessageRole,
    /// Message body
    pub text: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Choices offered alongside an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<MessageChoice>,
    /// Product suggestions attached to an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
    /// Wall-clock delay between the triggering input and this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl Message {
    /// Create a new message
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
            choices: Vec::new(),
            products: Vec::new(),
            latency_ms: None,
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Attach choices to the message
    pub fn with_choices(mut self, choices: Vec<MessageChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Attach product suggestions to the message
    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    /// Record the response latency for this message
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Whether the message offers choices to the user
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("I need a gift");
        assert_eq!(msg.role, MessageRole::User);
        assert!(!msg.has_choices());

        let msg = Message::assistant("What's the occasion?")
            .with_choices(vec![MessageChoice::new("birthday", "Birthday")]);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.has_choices());
    }

    #[test]
    fn test_latency_attachment() {
        let msg = Message::assistant("Here you go").with_latency(850);
        assert_eq!(msg.latency_ms, Some(850));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(MessageRole::User.to_string(), "user");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }
}

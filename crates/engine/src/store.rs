//! Conversation storage
//!
//! A pluggable store keyed by conversation id. The engine persists after
//! each completed turn; store failures are logged by the caller and never
//! fail a turn.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use giftwise_config::AnswerMap;
use giftwise_core::{Message, MessageRole, MetricsSnapshot, Persona};

use crate::EngineError;

/// Characters of the first user message kept as the conversation title
const TITLE_LIMIT: usize = 48;

/// Serializable snapshot of one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredConversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub answers: AnswerMap,
    pub persona: Persona,
    pub metrics: MetricsSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredConversation {
    /// Derive a display title from the first thing the user said
    pub fn title_from(messages: &[Message]) -> String {
        messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.text.chars().take(TITLE_LIMIT).collect())
            .unwrap_or_else(|| "New conversation".to_string())
    }
}

/// Persistence boundary for conversations
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save or replace a conversation snapshot
    async fn save(&self, conversation: &StoredConversation) -> Result<(), EngineError>;

    /// Load a conversation by id
    async fn load(&self, id: &str) -> Result<Option<StoredConversation>, EngineError>;

    /// Discard a conversation
    async fn delete(&self, id: &str) -> Result<(), EngineError>;

    /// All stored conversations, most recently updated first
    async fn list(&self) -> Result<Vec<StoredConversation>, EngineError>;

    /// Mark the conversation the host should resume, or clear the mark
    async fn set_current(&self, id: Option<&str>) -> Result<(), EngineError>;

    /// Id of the conversation to resume, if any
    async fn current(&self) -> Result<Option<String>, EngineError>;
}

/// In-memory store, the default backend
#[derive(Default)]
pub struct InMemorySessionStore {
    conversations: RwLock<HashMap<String, StoredConversation>>,
    current: RwLock<Option<String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, conversation: &StoredConversation) -> Result<(), EngineError> {
        self.conversations
            .write()
            .insert(conversation.id.clone(), conversation.clone());
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<StoredConversation>, EngineError> {
        Ok(self.conversations.read().get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<(), EngineError> {
        self.conversations.write().remove(id);
        let mut current = self.current.write();
        if current.as_deref() == Some(id) {
            *current = None;
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredConversation>, EngineError> {
        let mut all: Vec<StoredConversation> =
            self.conversations.read().values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }

    async fn set_current(&self, id: Option<&str>) -> Result<(), EngineError> {
        *self.current.write() = id.map(String::from);
        Ok(())
    }

    async fn current(&self) -> Result<Option<String>, EngineError> {
        Ok(self.current.read().clone())
    }
}

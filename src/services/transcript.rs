//! In-memory chat transcripts, one per (owner, diagram).
//!
//! Each transcript keeps at most [`MAX_MESSAGES_PER_DIAGRAM`] entries; the
//! oldest are dropped first.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::llm::types::Role;

pub const MAX_MESSAGES_PER_DIAGRAM: usize = 200;

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), role, content: content.into(), timestamp: OffsetDateTime::now_utc() }
    }
}

#[derive(Clone)]
pub struct Transcripts {
    inner: Arc<RwLock<HashMap<(String, Uuid), Vec<ChatMessage>>>>,
    limit: usize,
}

impl Default for Transcripts {
    fn default() -> Self {
        Self::with_limit(MAX_MESSAGES_PER_DIAGRAM)
    }
}

impl Transcripts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` messages per diagram (minimum one).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { inner: Arc::default(), limit: limit.max(1) }
    }

    pub async fn append(&self, owner: &str, diagram_id: Uuid, message: ChatMessage) {
        let mut inner = self.inner.write().await;
        let messages = inner.entry((owner.to_string(), diagram_id)).or_default();
        messages.push(message);
        if messages.len() > self.limit {
            let excess = messages.len() - self.limit;
            messages.drain(..excess);
        }
    }

    /// Messages in the order they were appended.
    pub async fn list(&self, owner: &str, diagram_id: Uuid) -> Vec<ChatMessage> {
        let inner = self.inner.read().await;
        inner
            .get(&(owner.to_string(), diagram_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Drop the transcript. Returns how many messages were removed.
    pub async fn clear(&self, owner: &str, diagram_id: Uuid) -> usize {
        let mut inner = self.inner.write().await;
        inner
            .remove(&(owner.to_string(), diagram_id))
            .map_or(0, |messages| messages.len())
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

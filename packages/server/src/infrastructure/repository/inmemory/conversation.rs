//! In-memory `ConversationStore` implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use crate::domain::{
    ContinuationToken, ConversationId, ConversationStore, MessageRecord, StoreError,
};

/// Append-only message logs keyed by conversation identifier.
#[derive(Default)]
pub struct InMemoryConversationStore {
    logs: Mutex<HashMap<ConversationId, Vec<MessageRecord>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn token_for(record: &MessageRecord) -> ContinuationToken {
        ContinuationToken(json!({
            "conversationId": record.conversation_id.as_str(),
            "createdAt": record.created_at,
            "timestamp": record.timestamp,
            "sender": record.sender.as_str(),
        }))
    }

    /// Index of the first record strictly after the token's position in
    /// the newest-first ordering. A token that no longer matches any
    /// record falls back to skipping everything at or above its
    /// `createdAt`; a malformed token is ignored.
    fn resume_index(sorted: &[MessageRecord], token: &ContinuationToken) -> usize {
        let created_at = token.0.get("createdAt").and_then(|v| v.as_i64());
        let timestamp = token.0.get("timestamp").and_then(|v| v.as_str());
        let sender = token.0.get("sender").and_then(|v| v.as_str());

        let (Some(created_at), Some(timestamp), Some(sender)) = (created_at, timestamp, sender)
        else {
            tracing::warn!("Ignoring malformed continuation token");
            return 0;
        };

        if let Some(pos) = sorted.iter().position(|r| {
            r.created_at == created_at && r.timestamp == timestamp && r.sender.as_str() == sender
        }) {
            return pos + 1;
        }
        sorted
            .iter()
            .position(|r| r.created_at < created_at)
            .unwrap_or(sorted.len())
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, record: MessageRecord) -> Result<(), StoreError> {
        let mut logs = self.logs.lock().await;
        logs.entry(record.conversation_id.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn query_recent(
        &self,
        conversation_id: &ConversationId,
        max_created_at: i64,
        limit: usize,
        exclusive_start: Option<ContinuationToken>,
    ) -> Result<(Vec<MessageRecord>, Option<ContinuationToken>), StoreError> {
        let logs = self.logs.lock().await;

        let mut matching: Vec<MessageRecord> = logs
            .get(conversation_id)
            .map(|log| {
                log.iter()
                    .filter(|r| r.created_at <= max_created_at)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Newest first; timestamp and sender break created_at ties so
        // the ordering is total and paging stays stable.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| b.sender.cmp(&a.sender))
        });

        let start = match exclusive_start {
            Some(token) => Self::resume_index(&matching, &token),
            None => 0,
        };

        let remaining = &matching[start.min(matching.len())..];
        let page: Vec<MessageRecord> = remaining.iter().take(limit).cloned().collect();
        let token = if remaining.len() > page.len() {
            page.last().map(Self::token_for)
        } else {
            None
        };

        Ok((page, token))
    }
}

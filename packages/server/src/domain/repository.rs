//! Store traits the relay core depends on.
//!
//! The presence store owns presence records, the conversation store owns
//! message records. Each operation is atomic for a single record; the
//! core holds no shared mutable state of its own and delegates all
//! coordination to these guarantees.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::{
    ConnectionId, ContinuationToken, ConversationId, MessageRecord, Nickname, PresenceRecord,
};

/// A durable store call failed for infrastructure reasons.
#[derive(Debug, Error)]
#[error("store unavailable: {0}")]
pub struct StoreError(pub String);

/// Durable mapping from connection identity to nickname; the backing
/// for "who is online".
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Create or overwrite the presence record for a connection.
    /// Idempotent.
    async fn put(&self, record: PresenceRecord) -> Result<(), StoreError>;

    /// Remove the presence record. Idempotent: absent records are not an
    /// error.
    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), StoreError>;

    async fn get(&self, connection_id: &ConnectionId)
        -> Result<Option<PresenceRecord>, StoreError>;

    /// Full presence snapshot.
    async fn list_all(&self) -> Result<Vec<PresenceRecord>, StoreError>;

    /// Resolve a nickname to its currently live connection, if any.
    ///
    /// When several presence records share the nickname, the one with
    /// the most recent `connected_at` wins; ties break toward the
    /// greatest connection id. Deterministic by construction.
    async fn find_by_nickname(
        &self,
        nickname: &Nickname,
    ) -> Result<Option<ConnectionId>, StoreError>;
}

/// Append-only per-conversation message log with time-ordered retrieval.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Write one immutable message record.
    async fn append(&self, record: MessageRecord) -> Result<(), StoreError>;

    /// Return at most `limit` records with `created_at <= max_created_at`,
    /// strictly descending by creation instant, resuming after
    /// `exclusive_start` when given. The returned token is present iff
    /// more records remain.
    async fn query_recent(
        &self,
        conversation_id: &ConversationId,
        max_created_at: i64,
        limit: usize,
        exclusive_start: Option<ContinuationToken>,
    ) -> Result<(Vec<MessageRecord>, Option<ContinuationToken>), StoreError>;
}

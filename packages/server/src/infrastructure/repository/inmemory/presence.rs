//! In-memory `PresenceStore` implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, Nickname, PresenceRecord, PresenceStore, StoreError};

/// Presence records keyed by connection identity.
#[derive(Default)]
pub struct InMemoryPresenceStore {
    records: Mutex<HashMap<ConnectionId, PresenceRecord>>,
}

impl InMemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn put(&self, record: PresenceRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.insert(record.connection_id.clone(), record);
        Ok(())
    }

    async fn delete(&self, connection_id: &ConnectionId) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        records.remove(connection_id);
        Ok(())
    }

    async fn get(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<PresenceRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.get(connection_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<PresenceRecord>, StoreError> {
        let records = self.records.lock().await;
        let mut all: Vec<PresenceRecord> = records.values().cloned().collect();
        // Sort by connection id for consistent ordering
        all.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        Ok(all)
    }

    async fn find_by_nickname(
        &self,
        nickname: &Nickname,
    ) -> Result<Option<ConnectionId>, StoreError> {
        let records = self.records.lock().await;
        // Most recent connect wins; ties break toward the greatest
        // connection id so the pick is deterministic.
        let winner = records
            .values()
            .filter(|r| &r.nickname == nickname)
            .max_by(|a, b| {
                a.connected_at
                    .cmp(&b.connected_at)
                    .then_with(|| a.connection_id.cmp(&b.connection_id))
            });
        Ok(winner.map(|r| r.connection_id.clone()))
    }
}

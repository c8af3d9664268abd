//! Session resolution: connection identity to presence record.

use std::sync::Arc;

use crate::domain::{ConnectionId, PresenceRecord, PresenceStore};

use super::RelayError;

/// Resolves a connection identity to its current presence record.
/// Side-effect-free.
pub struct SessionResolver {
    presence: Arc<dyn PresenceStore>,
}

impl SessionResolver {
    pub fn new(presence: Arc<dyn PresenceStore>) -> Self {
        Self { presence }
    }

    /// Fails with `UnknownConnection` when no presence record exists,
    /// e.g. a payload-bearing operation before `connect` completed, or
    /// after the connection was evicted as stale.
    pub async fn resolve(&self, connection_id: &ConnectionId) -> Result<PresenceRecord, RelayError> {
        self.presence
            .get(connection_id)
            .await?
            .ok_or(RelayError::UnknownConnection)
    }
}

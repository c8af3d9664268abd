//! UseCase: client disconnect.
//!
//! Idempotent: disconnecting an already-absent connection is a no-op.
//! Lifecycle operation, so failures never produce a client-visible
//! push.

use std::sync::Arc;

use crate::domain::{ConnectionId, PresenceStore};

use super::{PresenceBroadcaster, RelayError};

pub struct DisconnectUseCase {
    presence: Arc<dyn PresenceStore>,
    broadcaster: Arc<PresenceBroadcaster>,
}

impl DisconnectUseCase {
    pub fn new(presence: Arc<dyn PresenceStore>, broadcaster: Arc<PresenceBroadcaster>) -> Self {
        Self {
            presence,
            broadcaster,
        }
    }

    /// Removes the presence record and announces the shrunken snapshot
    /// to everyone still registered. The disconnecting connection is
    /// already gone, so excluding it is belt-and-braces.
    pub async fn execute(&self, connection_id: &ConnectionId) -> Result<(), RelayError> {
        self.presence.delete(connection_id).await?;
        tracing::info!("Connection '{}' deregistered", connection_id.as_str());

        self.broadcaster.broadcast_excluding(connection_id).await
    }
}

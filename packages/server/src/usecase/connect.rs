//! UseCase: client connect.
//!
//! Registers the connection's presence record and announces the new
//! snapshot to everyone else. Lifecycle operation: failures are never
//! pushed to the client, only reflected in the transport-level
//! accept/reject status.

use std::sync::Arc;

use banter_shared::time::Clock;

use crate::domain::{ConnectionId, Nickname, PresenceRecord, PresenceStore};

use super::{PresenceBroadcaster, RelayError};

pub struct ConnectUseCase {
    presence: Arc<dyn PresenceStore>,
    broadcaster: Arc<PresenceBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        broadcaster: Arc<PresenceBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presence,
            broadcaster,
            clock,
        }
    }

    /// Transitions the connection Unregistered -> Registered.
    ///
    /// `nickname` comes from the connect payload (query-like
    /// parameters). A missing or empty nickname is `RejectedConnect`.
    /// Re-connecting with the same connection identity overwrites the
    /// existing record.
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        nickname: Option<String>,
    ) -> Result<(), RelayError> {
        let nickname = nickname
            .and_then(|n| Nickname::new(n).ok())
            .ok_or(RelayError::RejectedConnect)?;

        let record = PresenceRecord {
            connection_id: connection_id.clone(),
            nickname: nickname.clone(),
            connected_at: self.clock.now_millis(),
        };
        self.presence.put(record).await?;
        tracing::info!(
            "Connection '{}' registered as '{}'",
            connection_id.as_str(),
            nickname.as_str()
        );

        self.broadcaster.broadcast_excluding(&connection_id).await
    }
}

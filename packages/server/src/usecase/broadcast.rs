//! Presence-change broadcast: fan the current snapshot out to every
//! registered connection except the one that triggered the change.

use std::sync::Arc;

use futures_util::future::join_all;

use crate::domain::{ConnectionId, DeliveryChannel, PresenceStore};
use crate::infrastructure::dto::websocket::OutboundPayload;

use super::RelayError;

pub struct PresenceBroadcaster {
    presence: Arc<dyn PresenceStore>,
    channel: Arc<dyn DeliveryChannel>,
}

impl PresenceBroadcaster {
    pub fn new(presence: Arc<dyn PresenceStore>, channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { presence, channel }
    }

    /// Snapshot the presence set once, then deliver it individually to
    /// every other connection. Deliveries fan out concurrently; one
    /// stale or failed recipient never blocks the others. Stale
    /// recipients are evicted by the channel itself.
    pub async fn broadcast_excluding(&self, excluded: &ConnectionId) -> Result<(), RelayError> {
        let snapshot = self.presence.list_all().await?;
        let payload = OutboundPayload::clients(&snapshot).to_json();

        let attempts = snapshot
            .iter()
            .filter(|r| &r.connection_id != excluded)
            .map(|r| {
                let channel = self.channel.clone();
                let connection_id = r.connection_id.clone();
                let payload = payload.clone();
                async move {
                    if let Err(e) = channel.send(&connection_id, &payload).await {
                        tracing::warn!(
                            "Presence broadcast to '{}' failed: {}",
                            connection_id.as_str(),
                            e
                        );
                    }
                }
            });

        join_all(attempts).await;
        Ok(())
    }
}

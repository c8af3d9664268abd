//! WebSocket-backed `DeliveryChannel`.
//!
//! Holds the per-connection sender half of each live socket's outbound
//! channel. The UI layer registers a sender when a socket upgrades and
//! unregisters it when the socket closes; between those two points a
//! send can still fail if the pump task has already dropped its
//! receiver, which is exactly the stale-connection case.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::domain::{
    ConnectionId, DeliveryChannel, DeliveryError, DeliveryOutcome, PresenceStore,
};

pub struct WebSocketDeliveryChannel {
    senders: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
    presence: Arc<dyn PresenceStore>,
}

impl WebSocketDeliveryChannel {
    pub fn new(presence: Arc<dyn PresenceStore>) -> Self {
        Self {
            senders: Mutex::new(HashMap::new()),
            presence,
        }
    }

    /// Attach the outbound sender for a freshly upgraded socket.
    pub async fn register(&self, connection_id: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut senders = self.senders.lock().await;
        senders.insert(connection_id.clone(), sender);
        tracing::debug!("Connection '{}' registered", connection_id.as_str());
    }

    /// Detach the sender for a closed socket. Idempotent.
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut senders = self.senders.lock().await;
        senders.remove(connection_id);
        tracing::debug!("Connection '{}' unregistered", connection_id.as_str());
    }

    /// The transport reported the connection gone: drop its sender and
    /// its presence record so later snapshots omit it.
    async fn evict_stale(&self, connection_id: &ConnectionId) {
        {
            let mut senders = self.senders.lock().await;
            senders.remove(connection_id);
        }
        if let Err(e) = self.presence.delete(connection_id).await {
            tracing::warn!(
                "Failed to delete presence for stale connection '{}': {}",
                connection_id.as_str(),
                e
            );
        } else {
            tracing::info!(
                "Stale connection '{}' evicted from presence",
                connection_id.as_str()
            );
        }
    }
}

#[async_trait]
impl DeliveryChannel for WebSocketDeliveryChannel {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let sender = {
            let senders = self.senders.lock().await;
            senders.get(connection_id).cloned()
        };

        match sender {
            Some(tx) if tx.send(payload.to_string()).is_ok() => {
                tracing::debug!("Pushed payload to connection '{}'", connection_id.as_str());
                Ok(DeliveryOutcome::Delivered)
            }
            // Receiver dropped or never registered: the connection no
            // longer exists as far as the transport is concerned.
            _ => {
                self.evict_stale(connection_id).await;
                Ok(DeliveryOutcome::Stale)
            }
        }
    }
}

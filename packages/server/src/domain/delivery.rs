//! Delivery channel abstraction: push one payload to one live
//! connection, with stale-connection detection.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use super::ConnectionId;

/// Outcome of a single delivery attempt. At-most-once; the core does
/// not retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the payload.
    Delivered,
    /// The transport reported the connection no longer exists. The
    /// channel has already removed the connection's presence record;
    /// callers treat this as a non-error, fire-and-forget outcome.
    Stale,
}

/// Fatal transport failure; anything other than staleness.
#[derive(Debug, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Push a payload to one live connection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        payload: &str,
    ) -> Result<DeliveryOutcome, DeliveryError>;
}

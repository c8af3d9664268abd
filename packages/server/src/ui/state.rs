//! Shared application state.

use std::sync::Arc;

use crate::infrastructure::delivery::WebSocketDeliveryChannel;
use crate::usecase::RelayDispatcher;

/// Shared application state.
///
/// The delivery channel is held concretely here because the transport
/// layer needs `register`/`unregister`, which are not part of the
/// `DeliveryChannel` seam the relay core sees.
pub struct AppState {
    pub dispatcher: Arc<RelayDispatcher>,
    pub channel: Arc<WebSocketDeliveryChannel>,
}

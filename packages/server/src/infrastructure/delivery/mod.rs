//! Delivery channel implementations.

mod websocket;

pub use websocket::WebSocketDeliveryChannel;

//! Data Transfer Objects for the WebSocket wire protocol.

pub mod websocket;

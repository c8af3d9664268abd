//! Presence and direct-message relay.
//!
//! Clients connect over WebSocket, announce a nickname, see the live
//! set of other connected clients, exchange private messages, and page
//! through conversation history.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

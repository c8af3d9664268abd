//! Domain layer: value objects and the trait seams the relay core
//! depends on.
//!
//! The usecase layer depends only on the traits defined here; the
//! infrastructure layer provides the concrete implementations
//! (dependency inversion).

mod delivery;
mod model;
mod repository;

pub use delivery::{DeliveryChannel, DeliveryError, DeliveryOutcome};
pub use model::{
    ConnectionId, ContinuationToken, ConversationId, DomainError, MessageRecord, Nickname,
    PresenceRecord,
};
pub use repository::{ConversationStore, PresenceStore, StoreError};

#[cfg(test)]
pub use repository::{MockConversationStore, MockPresenceStore};

#[cfg(test)]
pub use delivery::MockDeliveryChannel;

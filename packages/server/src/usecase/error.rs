//! Error taxonomy for relay operations.

use thiserror::Error;

use crate::domain::{DeliveryError, StoreError};

/// Everything a relay operation can fail with.
///
/// The dispatcher decides what each kind means for the client:
/// `UnknownConnection` and `InvalidPayload` become an `error`-typed
/// push on non-lifecycle operations, `RejectedConnect` becomes a
/// transport-level reject, and the rest are logged and swallowed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `connect` without a usable nickname.
    #[error("nickname missing")]
    RejectedConnect,

    /// The operation requires an established session that doesn't exist.
    #[error("client does not exist")]
    UnknownConnection,

    /// Required payload fields missing or malformed.
    #[error("{0}")]
    InvalidPayload(String),

    /// Transport push failed for a reason other than staleness.
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    /// A durable store call failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for RelayError {
    fn from(e: StoreError) -> Self {
        Self::StoreUnavailable(e.0)
    }
}

impl From<DeliveryError> for RelayError {
    fn from(e: DeliveryError) -> Self {
        Self::DeliveryFailed(e.0)
    }
}

use hookrelay_core::CoreError;
use hookrelay_db::StoreError;

/// Error type for engine operations.
///
/// Delivery-level failures never surface here; they are recorded on the
/// delivery record and published as [`DeliveryOutcome`](crate::DeliveryOutcome)s.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain error (validation, not-found).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A payload could not be serialized.
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

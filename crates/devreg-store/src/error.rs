use thiserror::Error;

/// Errors raised by any `devreg-store` repository implementation.
///
/// `NotFound` and `Exists` are domain errors the Registry expects to match on
/// (§7 of the design); everything else is an infrastructure failure that is
/// propagated with its cause preserved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device already exists: {0}")]
    DeviceExists(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("group already exists: {0}")]
    GroupExists(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal store error: {0}")]
    Internal(String),
}

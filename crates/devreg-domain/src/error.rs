use thiserror::Error;

/// Validation and construction failures for domain types.
///
/// Each variant is a distinct sentinel so callers can `matches!` against a
/// specific failure kind instead of inspecting the message.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid slug: {0}")]
    InvalidSlug(String),

    #[error("invalid device type: {0}")]
    InvalidDeviceType(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    #[error("invalid capability: {0}")]
    InvalidCapability(String),

    #[error("invalid health status: {0}")]
    InvalidHealthStatus(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid state: {0}")]
    InvalidState(String),
}

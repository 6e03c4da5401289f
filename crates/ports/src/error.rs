use thiserror::Error;

/// Errors a repository adapter (Postgres or in-memory) can raise.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors the message bus adapter can raise.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to publish event: {0}")]
    Publish(String),

    #[error("subscription closed")]
    Closed,
}

/// Errors the payment gateway adapter can raise.
///
/// Declined charges are not modeled as errors — the gateway returns a
/// `ChargeOutcome` with `success: false` for those. This enum is reserved
/// for transport-level failures: the gateway itself being unreachable or
/// timing out.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway timed out")]
    Timeout,

    #[error("payment gateway transport error: {0}")]
    Transport(String),
}

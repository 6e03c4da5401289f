use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, SagaId};
use event_envelope::EventId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RepositoryError;

/// Terminal or in-flight status of a saga instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SagaStatus {
    Started,
    Completed,
    Failed,
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SagaStatus::Started => "STARTED",
            SagaStatus::Completed => "COMPLETED",
            SagaStatus::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// One row of the saga's event log, as returned by `get_saga_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaLogEntry {
    pub event_id: EventId,
    pub event_type: String,
    pub event_data: Value,
    pub timestamp: DateTime<Utc>,
}

/// The full history of one saga: its record plus every event logged
/// against it, in the order they were logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaHistory {
    pub saga_id: SagaId,
    pub order_id: OrderId,
    pub status: SagaStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub events: Vec<SagaLogEntry>,
}

/// Append-only audit trail for saga execution, keyed by `saga_id`.
///
/// `log_event` is keyed by `(saga_id, event_id)` UNIQUE so a redelivered
/// event is logged at most once, even under at-least-once delivery.
#[async_trait]
pub trait SagaLogStore: Send + Sync {
    async fn start_saga(&self, saga_id: SagaId, order_id: OrderId) -> Result<(), RepositoryError>;

    async fn log_event(
        &self,
        saga_id: SagaId,
        event_id: EventId,
        event_type: &str,
        event_data: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    async fn end_saga(&self, saga_id: SagaId, status: SagaStatus) -> Result<(), RepositoryError>;

    async fn get_saga_history(
        &self,
        saga_id: SagaId,
    ) -> Result<Option<SagaHistory>, RepositoryError>;
}

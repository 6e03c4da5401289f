//! Postgres outbox: the concrete mechanism behind "persist and publish must
//! appear atomic" (spec's outbox requirement). `CreateOrder`/`CancelOrder`
//! enqueue rows in the same transaction as the order write; a background
//! task drains the table and publishes to the bus, then marks rows
//! published. Without this, a crash between persisting and publishing would
//! strand a saga with no way to resume it.

use std::time::Duration;

use event_envelope::EventEnvelope;
use ports::{EventBus, RepositoryError};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

#[derive(Clone)]
pub struct PostgresOutbox {
    pool: PgPool,
}

impl PostgresOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueues an event inside an already-open transaction, so the insert
    /// commits or rolls back together with the aggregate write.
    pub async fn enqueue_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        envelope: &EventEnvelope,
    ) -> Result<(), RepositoryError> {
        let payload = serde_json::to_value(envelope)?;
        sqlx::query(
            "INSERT INTO order_outbox (id, topic, payload, published, created_at) VALUES ($1, $2, $3, false, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(envelope.topic().as_str())
        .bind(payload)
        .bind(envelope.timestamp)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Enqueues an event in its own transaction, for callers that don't
    /// already have one open. The background publisher loop is responsible
    /// for actually delivering it to the bus.
    pub async fn enqueue(&self, envelope: &EventEnvelope) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        Self::enqueue_in_tx(&mut tx, envelope).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Publishes every unpublished row to `bus`, marking each published as
    /// it succeeds. Returns the number of rows published.
    pub async fn publish_pending(&self, bus: &dyn EventBus) -> Result<usize, RepositoryError> {
        // SKIP LOCKED only holds its lock for the lifetime of the
        // transaction that took it, so the select-then-update must share
        // one transaction or a second poller could grab the same rows.
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT id, payload FROM order_outbox WHERE published = false
             ORDER BY created_at ASC FOR UPDATE SKIP LOCKED LIMIT 100",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut published = 0;
        for row in rows {
            let id: Uuid = row.try_get("id")?;
            let payload: serde_json::Value = row.try_get("payload")?;
            let envelope: EventEnvelope = serde_json::from_value(payload)?;

            if bus.publish(envelope).await.is_err() {
                tracing::warn!(outbox_id = %id, "failed to publish outbox row, will retry");
                continue;
            }

            sqlx::query("UPDATE order_outbox SET published = true WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            published += 1;
        }
        tx.commit().await?;
        Ok(published)
    }

    /// Runs `publish_pending` on a fixed interval until the process exits.
    pub async fn run_publisher_loop(self, bus: impl EventBus + 'static, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(error) = self.publish_pending(&bus).await {
                tracing::error!(%error, "outbox publisher tick failed");
            }
        }
    }
}

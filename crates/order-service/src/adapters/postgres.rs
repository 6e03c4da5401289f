use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, ProductId, SagaId};
use event_envelope::EventId;
use ports::{OrderRepository, RepositoryError, SagaHistory, SagaLogEntry, SagaLogStore, SagaStatus};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::domain::{Order, OrderItem, OrderStatus};

/// Postgres-backed order repository. `save` upserts the order row and
/// replaces its `order_items` rows inside one transaction.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_status(raw: &str) -> OrderStatus {
        serde_json::from_value(Value::String(raw.to_string()))
            .unwrap_or(OrderStatus::Failed)
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    type Order = Order;

    async fn save(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let metadata_json = serde_json::to_value(&order.metadata)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, created_at, modified_at, saga_id, metadata, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                modified_at = EXCLUDED.modified_at,
                metadata = EXCLUDED.metadata,
                total_amount = EXCLUDED.total_amount
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_str())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.modified_at)
        .bind(order.saga_id.map(|id| id.as_uuid()))
        .bind(metadata_json)
        .bind(order.total_amount().as_dollars())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price) VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id.as_uuid())
            .bind(item.product_id.as_str())
            .bind(item.quantity as i64)
            .bind(item.unit_price.as_dollars())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = self.load_items(id).await?;
        Ok(Some(self.row_to_order(row, items)?))
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC")
            .bind(customer_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id = OrderId::from_uuid(row.try_get("id")?);
            let items = self.load_items(id).await?;
            orders.push(self.row_to_order(row, items)?);
        }
        Ok(orders)
    }
}

impl PostgresOrderRepository {
    async fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT product_id, quantity, unit_price FROM order_items WHERE order_id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OrderItem {
                    product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
                    quantity: row.try_get::<i64, _>("quantity")? as u32,
                    unit_price: Money::from_dollars(row.try_get("unit_price")?),
                })
            })
            .collect()
    }

    fn row_to_order(&self, row: PgRow, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let metadata_json: Value = row.try_get("metadata")?;
        let metadata: HashMap<String, Value> = serde_json::from_value(metadata_json)?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get("id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            items,
            status: Self::row_to_status(&row.try_get::<String, _>("status")?),
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
            saga_id: row
                .try_get::<Option<Uuid>, _>("saga_id")?
                .map(SagaId::from_uuid),
            metadata,
        })
    }
}

/// Postgres-backed saga log. `log_event` relies on the `(saga_id, event_id)`
/// unique constraint to discard duplicate logs from redelivered events.
#[derive(Clone)]
pub struct PostgresSagaLogStore {
    pool: PgPool,
}

impl PostgresSagaLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SagaLogStore for PostgresSagaLogStore {
    async fn start_saga(&self, saga_id: SagaId, order_id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO saga_log (saga_id, order_id, status, started_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (saga_id) DO NOTHING",
        )
        .bind(saga_id.as_uuid())
        .bind(order_id.as_uuid())
        .bind(SagaStatus::Started.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn log_event(
        &self,
        saga_id: SagaId,
        event_id: EventId,
        event_type: &str,
        event_data: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO saga_events (saga_id, event_id, event_type, event_data, timestamp)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (saga_id, event_id) DO NOTHING",
        )
        .bind(saga_id.as_uuid())
        .bind(event_id.as_uuid())
        .bind(event_type)
        .bind(event_data)
        .bind(timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn end_saga(&self, saga_id: SagaId, status: SagaStatus) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE saga_log SET status = $2, ended_at = $3 WHERE saga_id = $1 AND ended_at IS NULL",
        )
        .bind(saga_id.as_uuid())
        .bind(status.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_saga_history(
        &self,
        saga_id: SagaId,
    ) -> Result<Option<SagaHistory>, RepositoryError> {
        let Some(saga_row) = sqlx::query("SELECT * FROM saga_log WHERE saga_id = $1")
            .bind(saga_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let event_rows = sqlx::query(
            "SELECT event_id, event_type, event_data, timestamp FROM saga_events
             WHERE saga_id = $1 ORDER BY timestamp ASC",
        )
        .bind(saga_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let events = event_rows
            .into_iter()
            .map(|row| {
                Ok(SagaLogEntry {
                    event_id: EventId::from_uuid(row.try_get("event_id")?),
                    event_type: row.try_get("event_type")?,
                    event_data: row.try_get("event_data")?,
                    timestamp: row.try_get("timestamp")?,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let status: String = saga_row.try_get("status")?;
        Ok(Some(SagaHistory {
            saga_id,
            order_id: OrderId::from_uuid(saga_row.try_get("order_id")?),
            status: match status.as_str() {
                "COMPLETED" => SagaStatus::Completed,
                "FAILED" => SagaStatus::Failed,
                _ => SagaStatus::Started,
            },
            started_at: saga_row.try_get("started_at")?,
            ended_at: saga_row.try_get("ended_at")?,
            events,
        }))
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use common::{CustomerId, Money, OrderId, PaymentId, SagaId};
use ports::{PaymentRepository, RepositoryError};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::{Payment, PaymentMethod, PaymentStatus};

/// Postgres-backed payment repository.
#[derive(Clone)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: PgRow) -> Result<Payment, RepositoryError> {
        let metadata_json: Value = row.try_get("metadata")?;
        let metadata: HashMap<String, Value> = serde_json::from_value(metadata_json)?;
        let status: String = row.try_get("status")?;
        let payment_method: String = row.try_get("payment_method")?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.try_get("id")?),
            order_id: OrderId::from_uuid(row.try_get("order_id")?),
            customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
            amount: Money::from_dollars(row.try_get("amount")?),
            currency: row.try_get("currency")?,
            status: Self::parse_status(&status),
            payment_method: Self::parse_method(&payment_method),
            transaction_id: row.try_get("transaction_id")?,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
            saga_id: row
                .try_get::<Option<uuid::Uuid>, _>("saga_id")?
                .map(SagaId::from_uuid),
            metadata,
        })
    }

    fn parse_status(raw: &str) -> PaymentStatus {
        serde_json::from_value(Value::String(raw.to_string())).unwrap_or(PaymentStatus::Failed)
    }

    fn parse_method(raw: &str) -> PaymentMethod {
        serde_json::from_value(Value::String(raw.to_string())).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    type Payment = Payment;

    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        let metadata_json = serde_json::to_value(&payment.metadata)?;
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, order_id, customer_id, amount, currency, status, payment_method,
                transaction_id, created_at, modified_at, saga_id, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                transaction_id = EXCLUDED.transaction_id,
                modified_at = EXCLUDED.modified_at,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.order_id.as_uuid())
        .bind(payment.customer_id.as_str())
        .bind(payment.amount.as_dollars())
        .bind(&payment.currency)
        .bind(payment.status.as_str())
        .bind(payment.payment_method.as_str())
        .bind(&payment.transaction_id)
        .bind(payment.created_at)
        .bind(payment.modified_at)
        .bind(payment.saga_id.map(|id| id.as_uuid()))
        .bind(metadata_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let Some(row) = sqlx::query("SELECT * FROM payments WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Self::row_to_payment(row)?))
    }

    async fn find_by_order_and_saga(
        &self,
        order_id: OrderId,
        saga_id: Option<SagaId>,
    ) -> Result<Option<Payment>, RepositoryError> {
        let row = match saga_id {
            Some(saga_id) => {
                sqlx::query(
                    "SELECT * FROM payments WHERE order_id = $1 AND saga_id = $2
                     ORDER BY created_at DESC LIMIT 1",
                )
                .bind(order_id.as_uuid())
                .bind(saga_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM payments WHERE order_id = $1
                     ORDER BY created_at DESC LIMIT 1",
                )
                .bind(order_id.as_uuid())
                .fetch_optional(&self.pool)
                .await?
            }
        };
        row.map(Self::row_to_payment).transpose()
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use common::{Money, ProductId};
use ports::{ProductRepository, RepositoryError};
use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::Product;

/// Postgres-backed product repository. `try_allocate` is the conditional
/// `UPDATE ... WHERE quantity >= $n` spec.md §9 prescribes instead of a
/// SELECT-then-UPDATE: the database's own row lock makes the
/// read-modify-write atomic without this adapter ever holding a lock
/// across an `.await`.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product, RepositoryError> {
        let metadata_json: Value = row.try_get("metadata")?;
        let metadata: HashMap<String, Value> = serde_json::from_value(metadata_json)?;

        Ok(Product {
            id: ProductId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            sku: row.try_get("sku")?,
            price: Money::from_dollars(row.try_get("price")?),
            quantity: row.try_get::<i64, _>("quantity")? as u32,
            created_at: row.try_get("created_at")?,
            modified_at: row.try_get("modified_at")?,
            metadata,
        })
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    type Product = Product;

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        let metadata_json = serde_json::to_value(&product.metadata)?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, sku, price, quantity, created_at, modified_at, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                sku = EXCLUDED.sku,
                price = EXCLUDED.price,
                quantity = EXCLUDED.quantity,
                modified_at = EXCLUDED.modified_at,
                metadata = EXCLUDED.metadata
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price.as_dollars())
        .bind(product.quantity as i64)
        .bind(product.created_at)
        .bind(product.modified_at)
        .bind(metadata_json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let Some(row) = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Self::row_to_product(row)?))
    }

    async fn try_allocate(&self, id: &ProductId, quantity: u32) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET quantity = quantity - $2, modified_at = now()
             WHERE id = $1 AND quantity >= $2",
        )
        .bind(id.as_str())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, id: &ProductId, quantity: u32) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products SET quantity = quantity + $2, modified_at = now() WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::InventoryError;
use super::status::ProductStatus;

/// The Product aggregate. `id` doubles as the SKU-like key the order and
/// event schemas call `product_id` (spec.md §3/SPEC_FULL.md §3) — there is
/// no separate internal UUID, since nothing in this system ever looks a
/// product up any other way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Money,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
}

impl Product {
    pub fn create(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        sku: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Result<Self, InventoryError> {
        let name = name.into();
        let sku = sku.into();
        if name.trim().is_empty() {
            return Err(InventoryError::EmptyName);
        }
        if sku.trim().is_empty() {
            return Err(InventoryError::EmptySku);
        }
        if price < Money::ZERO {
            return Err(InventoryError::InvalidPrice);
        }
        let now = Utc::now();
        Ok(Self {
            id,
            name,
            description: description.into(),
            sku,
            price,
            quantity,
            created_at: now,
            modified_at: now,
            metadata: HashMap::new(),
        })
    }

    /// `OUT_OF_STOCK` (0) / `LOW_STOCK` (1-9) / `IN_STOCK` (>=10).
    pub fn status(&self) -> ProductStatus {
        ProductStatus::for_quantity(self.quantity)
    }

    /// Decrements `quantity` by `n` iff `n <= quantity`. Returns whether it
    /// succeeded; never leaves `quantity` negative.
    pub fn try_allocate(&mut self, n: u32) -> bool {
        if n > self.quantity {
            return false;
        }
        self.quantity -= n;
        self.modified_at = Utc::now();
        true
    }

    /// Increments `quantity` by `n`, with no upper bound.
    pub fn release(&mut self, n: u32) {
        self.quantity += n;
        self.modified_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(quantity: u32) -> Product {
        Product::create(
            ProductId::new("p1"),
            "Widget",
            "A widget",
            "SKU-1",
            Money::from_dollars(10.0),
            quantity,
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_name() {
        let err = Product::create(
            ProductId::new("p1"),
            "",
            "",
            "SKU-1",
            Money::from_dollars(10.0),
            1,
        )
        .unwrap_err();
        assert_eq!(err, InventoryError::EmptyName);
    }

    #[test]
    fn try_allocate_fails_when_insufficient_stock() {
        let mut product = new_product(5);
        assert!(!product.try_allocate(6));
        assert_eq!(product.quantity, 5);
    }

    #[test]
    fn try_allocate_decrements_on_success() {
        let mut product = new_product(5);
        assert!(product.try_allocate(5));
        assert_eq!(product.quantity, 0);
        assert_eq!(product.status(), ProductStatus::OutOfStock);
    }

    #[test]
    fn release_has_no_upper_bound() {
        let mut product = new_product(0);
        product.release(100);
        assert_eq!(product.quantity, 100);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProductId;
use ports::{ProductRepository, RepositoryError};
use tokio::sync::RwLock;

use crate::domain::Product;

/// In-memory product repository, used by tests and as the default adapter
/// when no `DATABASE_URL` is configured.
///
/// `try_allocate`/`release` take the write lock over the whole map rather
/// than a per-product lock: spec.md §5 only requires that one product's
/// read-modify-write never interleaves with another allocation on the same
/// product, and a single `RwLock` gives that for free at the cost of
/// serializing unrelated products too — an acceptable trade for an adapter
/// that exists to be replaced by the conditional-UPDATE Postgres adapter in
/// production.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    type Product = Product;

    async fn save(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn try_allocate(&self, id: &ProductId, quantity: u32) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id) else {
            return Ok(false);
        };
        Ok(product.try_allocate(quantity))
    }

    async fn release(&self, id: &ProductId, quantity: u32) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(id) else {
            return Err(RepositoryError::NotFound);
        };
        product.release(quantity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    async fn seeded(quantity: u32) -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new();
        let product = Product::create(
            ProductId::new("p1"),
            "Widget",
            "",
            "SKU-1",
            Money::from_dollars(10.0),
            quantity,
        )
        .unwrap();
        repo.save(&product).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn try_allocate_rejects_insufficient_stock_without_mutating() {
        let repo = seeded(5).await;
        let id = ProductId::new("p1");
        assert!(!repo.try_allocate(&id, 6).await.unwrap());
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn try_allocate_missing_product_returns_false_not_error() {
        let repo = InMemoryProductRepository::new();
        assert!(!repo.try_allocate(&ProductId::new("ghost"), 1).await.unwrap());
    }

    #[tokio::test]
    async fn release_restores_quantity() {
        let repo = seeded(5).await;
        let id = ProductId::new("p1");
        assert!(repo.try_allocate(&id, 5).await.unwrap());
        repo.release(&id, 5).await.unwrap();
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn concurrent_allocations_never_oversell() {
        let repo = Arc::new(seeded(10).await);
        let id = ProductId::new("p1");

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move { repo.try_allocate(&id, 1).await.unwrap() }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10, "exactly the initial stock may be allocated");
        assert_eq!(repo.find_by_id(&id).await.unwrap().unwrap().quantity, 0);
    }
}

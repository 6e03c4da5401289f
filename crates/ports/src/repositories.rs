use async_trait::async_trait;
use common::{CustomerId, OrderId, PaymentId, ProductId, SagaId};

use crate::RepositoryError;

/// Persists and retrieves orders. Implemented by a Postgres adapter and an
/// in-memory adapter; the aggregate type is an associated type so this
/// crate never has to depend on any one service's domain model.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    type Order;

    async fn save(&self, order: &Self::Order) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Self::Order>, RepositoryError>;
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Self::Order>, RepositoryError>;
}

/// Persists and retrieves payments.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    type Payment;

    async fn save(&self, payment: &Self::Payment) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Self::Payment>, RepositoryError>;

    /// Looks up a prior payment for the same `(order_id, saga_id)` pair, the
    /// idempotency key for `ProcessPayment`.
    async fn find_by_order_and_saga(
        &self,
        order_id: OrderId,
        saga_id: Option<SagaId>,
    ) -> Result<Option<Self::Payment>, RepositoryError>;
}

/// Persists and retrieves products, with atomic allocation primitives so
/// concurrent `AllocateInventory` calls never interleave a read-modify-write
/// on one product's quantity.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    type Product;

    async fn save(&self, product: &Self::Product) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Self::Product>, RepositoryError>;

    /// Atomically decrements `id`'s quantity by `quantity` if, and only if,
    /// enough stock is available. Returns `true` if the allocation
    /// succeeded, `false` if stock was insufficient (no error, no partial
    /// write) — the conditional-UPDATE semantics spec.md calls for.
    async fn try_allocate(
        &self,
        id: &ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError>;

    /// Reverses a prior successful `try_allocate`.
    async fn release(&self, id: &ProductId, quantity: u32) -> Result<(), RepositoryError>;
}

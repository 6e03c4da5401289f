//! Shared identifiers and value types for the order saga workspace.

mod ids;
mod money;

pub use ids::{CustomerId, OrderId, PaymentId, ProductId, SagaId};
pub use money::Money;

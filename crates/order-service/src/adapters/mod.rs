pub mod memory;
pub mod outbox;
pub mod postgres;

pub use memory::{InMemoryOrderRepository, InMemorySagaLogStore};
pub use outbox::PostgresOutbox;
pub use postgres::{PostgresOrderRepository, PostgresSagaLogStore};

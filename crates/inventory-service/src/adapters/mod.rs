pub mod memory;
pub mod outbox;
pub mod postgres;

pub use memory::InMemoryProductRepository;
pub use outbox::PostgresOutbox;
pub use postgres::PostgresProductRepository;

pub mod memory;
pub mod mock_gateway;
pub mod outbox;
pub mod postgres;

pub use memory::InMemoryPaymentRepository;
pub use mock_gateway::MockPaymentGateway;
pub use outbox::PostgresOutbox;
pub use postgres::PostgresPaymentRepository;

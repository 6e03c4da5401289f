//! Port traits shared across the order, payment, and inventory services:
//! repositories, the event bus, the saga log, and the payment gateway.

mod bus;
mod error;
mod gateway;
mod repositories;
mod saga_log;

pub use bus::{EventBus, Subscription};
pub use error::{BusError, GatewayError, RepositoryError};
pub use gateway::{ChargeOutcome, PaymentGateway, RefundOutcome};
pub use repositories::{OrderRepository, PaymentRepository, ProductRepository};
pub use saga_log::{SagaHistory, SagaLogEntry, SagaLogStore, SagaStatus};

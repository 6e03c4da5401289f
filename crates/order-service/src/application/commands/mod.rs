mod cancel_order;
mod create_order;

pub use cancel_order::{CancelOrderInput, CancelOrderOutput};
pub use create_order::{CreateOrderInput, CreateOrderOutput};

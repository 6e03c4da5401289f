mod get_customer_orders;
mod get_order;

pub use get_customer_orders::{GetCustomerOrdersInput, GetCustomerOrdersOutput};
pub use get_order::{GetOrderInput, OrderSnapshot};

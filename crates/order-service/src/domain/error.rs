use common::ProductId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order must have at least one item")]
    NoItems,

    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),

    #[error("price for product {0} must not be negative")]
    InvalidPrice(ProductId),

    #[error("Cannot cancel an order that has been shipped or delivered")]
    CannotCancelShippedOrDelivered,
}

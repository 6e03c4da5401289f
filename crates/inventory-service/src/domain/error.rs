use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("sku must not be empty")]
    EmptySku,

    #[error("price must not be negative")]
    InvalidPrice,
}

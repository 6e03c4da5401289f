use serde::{Deserialize, Serialize};

/// Derived from `quantity`, never stored directly (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl ProductStatus {
    pub fn for_quantity(quantity: u32) -> Self {
        match quantity {
            0 => ProductStatus::OutOfStock,
            1..=9 => ProductStatus::LowStock,
            _ => ProductStatus::InStock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::OutOfStock => "OUT_OF_STOCK",
            ProductStatus::LowStock => "LOW_STOCK",
            ProductStatus::InStock => "IN_STOCK",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

use serde::{Deserialize, Serialize};

/// A bus topic. Each event type has exactly one home topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Orders,
    Payments,
    Inventory,
    Shipping,
}

impl Topic {
    /// Returns the topic's wire name, as used for subscription and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Orders => "orders",
            Topic::Payments => "payments",
            Topic::Inventory => "inventory",
            Topic::Shipping => "shipping",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

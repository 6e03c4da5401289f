//! Configuration loaded from environment variables (spec.md §6).

/// Gateway configuration, read once at startup.
///
/// Env vars: `API_HOST`, `API_PORT`, `API_DEBUG`, `RUST_LOG`,
/// `ORDER_SERVICE_URL`, `PAYMENT_SERVICE_URL`, `INVENTORY_SERVICE_URL`.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub log_level: String,
    pub order_service_url: String,
    pub payment_service_url: String,
    pub inventory_service_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            debug: std::env::var("API_DEBUG")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            order_service_url: std::env::var("ORDER_SERVICE_URL")
                .unwrap_or_else(|_| "http://order-service:8001".to_string()),
            payment_service_url: std::env::var("PAYMENT_SERVICE_URL")
                .unwrap_or_else(|_| "http://payment-service:8003".to_string()),
            inventory_service_url: std::env::var("INVENTORY_SERVICE_URL")
                .unwrap_or_else(|_| "http://inventory-service:8002".to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Maps a path's leading segment to its upstream base URL, `None` for
    /// an unrecognized service name.
    pub fn upstream_for(&self, prefix: &str) -> Option<&str> {
        match prefix {
            "orders" => Some(&self.order_service_url),
            "payments" => Some(&self.payment_service_url),
            "inventory" => Some(&self.inventory_service_url),
            _ => None,
        }
    }
}

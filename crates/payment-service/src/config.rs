//! Configuration loaded from environment variables (spec.md §6).

/// Payment Service configuration, read once at startup.
///
/// Env vars: `API_HOST`, `API_PORT`, `API_DEBUG`, `POSTGRES_{HOST,PORT,
/// USER,PASSWORD,DB,MIN_CONNECTIONS,MAX_CONNECTIONS}`, `RUST_LOG`. When
/// `POSTGRES_HOST` is unset the service falls back to the in-memory
/// adapters.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub log_level: String,
    pub database_url: Option<String>,
    pub min_connections: u32,
    pub max_connections: u32,
    pub outbox_poll_interval_ms: u64,
    pub refund_success_rate: f64,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("POSTGRES_HOST").ok().map(|host| {
            let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
            let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
            let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();
            let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "payments".to_string());
            format!("postgres://{user}:{password}@{host}:{port}/{db}")
        });

        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8002),
            debug: std::env::var("API_DEBUG")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url,
            min_connections: std::env::var("POSTGRES_MIN_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            max_connections: std::env::var("POSTGRES_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            outbox_poll_interval_ms: std::env::var("OUTBOX_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            refund_success_rate: std::env::var("REFUND_SUCCESS_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.95),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_formats_host_and_port() {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 8002,
            debug: false,
            log_level: "info".into(),
            database_url: None,
            min_connections: 1,
            max_connections: 10,
            outbox_poll_interval_ms: 500,
            refund_success_rate: 0.95,
        };
        assert_eq!(config.addr(), "127.0.0.1:8002");
    }
}

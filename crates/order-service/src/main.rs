//! Order Service entry point.

use std::sync::Arc;
use std::time::Duration;

use bus::InMemoryEventBus;
use order_service::adapters::{
    InMemoryOrderRepository, InMemorySagaLogStore, PostgresOrderRepository, PostgresOutbox,
    PostgresSagaLogStore,
};
use order_service::application::OrderService;
use order_service::config::Config;
use ports::EventBus;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT, starting graceful shutdown"),
        () = terminate => tracing::info!("received SIGTERM, starting graceful shutdown"),
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?config, "loaded configuration");

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());

    let order_service = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .expect("failed to connect to Postgres");

            let outbox = Arc::new(PostgresOutbox::new(pool.clone()));
            tokio::spawn((*outbox).clone().run_publisher_loop(
                bus.clone(),
                Duration::from_millis(config.outbox_poll_interval_ms),
            ));

            Arc::new(OrderService::with_outbox(
                Arc::new(PostgresOrderRepository::new(pool.clone())),
                Arc::new(PostgresSagaLogStore::new(pool)),
                bus.clone(),
                outbox,
            ))
        }
        None => {
            tracing::warn!("POSTGRES_HOST not set, falling back to in-memory adapters");
            Arc::new(OrderService::new(
                Arc::new(InMemoryOrderRepository::new()),
                Arc::new(InMemorySagaLogStore::new()),
                bus.clone(),
            ))
        }
    };

    order_service::run_event_consumer(order_service.clone(), bus).await;

    let app = order_service::create_app(order_service, prometheus_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting order-service");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("order-service shut down gracefully");
}

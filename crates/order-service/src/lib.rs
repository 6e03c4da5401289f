//! Order Service: owns the `Order` aggregate, starts and ends sagas, and
//! reacts to `PaymentProcessed`/`InventoryAllocated`/`OrderShipped` events
//! from the bus (spec.md §4.1).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use event_envelope::Topic;
use metrics_exporter_prometheus::PrometheusHandle;
use ports::EventBus;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use application::OrderService;
use routes::orders::AppState;

/// Builds the axum router: order CRUD/saga endpoints, health, metrics.
pub fn create_app(order_service: Arc<OrderService>, metrics_handle: PrometheusHandle) -> Router {
    let state = Arc::new(AppState { order_service });

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/orders/{id}/cancel", post(routes::orders::cancel))
        .route("/orders/{id}/ship", post(routes::orders::ship))
        .route("/customers/{id}/orders", get(routes::orders::list_for_customer))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Subscribes to every topic this service reacts to and dispatches each
/// incoming event to its handler until the bus shuts the subscription down.
/// Runs until `subscribe` returns `None` on every lane, i.e. the bus (or the
/// process) is shutting down — no explicit cancellation token is needed
/// beyond that, matching the in-memory bus's drop-to-close semantics.
pub async fn run_event_consumer(order_service: Arc<OrderService>, bus: Arc<dyn EventBus>) {
    for topic in [Topic::Payments, Topic::Inventory, Topic::Shipping] {
        let order_service = order_service.clone();
        let bus = bus.clone();
        tokio::spawn(async move {
            let mut subscription = match bus.subscribe(topic).await {
                Ok(sub) => sub,
                Err(error) => {
                    tracing::error!(%topic, %error, "failed to subscribe, consumer loop exiting");
                    return;
                }
            };
            while let Some(envelope) = subscription.recv().await {
                let event_type = envelope.payload.event_type();
                if let Err(error) = application::event_handlers::dispatch(&order_service, envelope).await
                {
                    // At-least-once delivery: a transient failure here should
                    // be retried by the bus, not silently dropped. The
                    // in-memory bus has no nack/redelivery, so we log; a real
                    // broker adapter would nack instead.
                    tracing::error!(%topic, event_type, %error, "event handler failed");
                }
            }
            tracing::info!(%topic, "event consumer loop exiting");
        });
    }
}

//! Inventory Service: owns the `Product` aggregate, allocates and releases
//! stock, and reacts to `InventoryRequested` events from the bus
//! (spec.md §4.3).

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

use application::InventoryService;
use routes::inventory::AppState;

/// Builds the axum router: product endpoints, the synchronous allocate
/// endpoint, health, metrics.
pub fn create_app(inventory_service: Arc<InventoryService>, metrics_handle: PrometheusHandle) -> Router {
    let state = Arc::new(AppState { inventory_service });

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products", post(routes::inventory::create_product))
        .route("/products/{id}", get(routes::inventory::get_product))
        .route("/inventory/allocate", post(routes::inventory::allocate))
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

/// Subscribes to the `inventory` topic and dispatches every incoming event
/// to its handler until the bus shuts the subscription down.
pub async fn run_event_consumer(inventory_service: Arc<InventoryService>, bus: Arc<dyn EventBus>) {
    let topic = Topic::Inventory;
    let inventory_service = inventory_service.clone();
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
            if let Err(error) =
                application::event_handlers::dispatch(&inventory_service, envelope).await
            {
                tracing::error!(%topic, event_type, %error, "event handler failed");
            }
        }
        tracing::info!(%topic, "event consumer loop exiting");
    });
}

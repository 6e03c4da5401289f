//! Payment Service: owns the `Payment` aggregate, drives payments through
//! the gateway capability, and reacts to `PaymentRequested`/
//! `PaymentRefundRequested` events from the bus (spec.md §4.2).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use event_envelope::Topic;
use metrics_exporter_prometheus::PrometheusHandle;
use ports::EventBus;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use application::PaymentService;
use routes::payments::AppState;

/// Builds the axum router: payment query endpoint, health, metrics.
pub fn create_app(payment_service: Arc<PaymentService>, metrics_handle: PrometheusHandle) -> Router {
    let state = Arc::new(AppState { payment_service });

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/payments/{id}", get(routes::payments::get))
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

/// Subscribes to the `payments` topic and dispatches every incoming event
/// to its handler until the bus shuts the subscription down.
pub async fn run_event_consumer(payment_service: Arc<PaymentService>, bus: Arc<dyn EventBus>) {
    let topic = Topic::Payments;
    let payment_service = payment_service.clone();
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
            if let Err(error) = application::event_handlers::dispatch(&payment_service, envelope).await
            {
                // At-least-once delivery: a transient failure here should be
                // retried by the bus, not silently dropped. The in-memory
                // bus has no nack/redelivery, so we log; a real broker
                // adapter would nack instead.
                tracing::error!(%topic, event_type, %error, "event handler failed");
            }
        }
        tracing::info!(%topic, "event consumer loop exiting");
    });
}

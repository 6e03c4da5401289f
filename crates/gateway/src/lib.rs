//! Gateway: a thin path-prefix reverse proxy fanning HTTP requests out to
//! Order, Payment, and Inventory Service by the request's leading path
//! segment (spec.md §4.4). Holds no domain state of its own.

pub mod config;
pub mod proxy;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower_http::trace::TraceLayer;

use config::Config;
use proxy::GatewayState;

pub fn create_app(config: Arc<Config>) -> Router {
    let state = GatewayState {
        config,
        client: reqwest::Client::new(),
    };

    Router::new()
        .route("/health", get(routes::health))
        .fallback(any(proxy::proxy))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

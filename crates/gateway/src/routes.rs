use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::proxy::GatewayState;

/// GET /health — liveness plus the configured upstream base URLs
/// (spec.md §4.4).
pub async fn health(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "upstreams": {
            "orders": state.config.order_service_url,
            "payments": state.config.payment_service_url,
            "inventory": state.config.inventory_service_url,
        },
    }))
}

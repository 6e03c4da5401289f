use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CustomerId, OrderId};
use serde::Deserialize;

use crate::application::commands::{CancelOrderInput, CreateOrderInput};
use crate::application::event_handlers::handle_order_shipped;
use crate::application::queries::{GetCustomerOrdersInput, GetOrderInput};
use crate::domain::OrderItem;
use crate::error::ServiceError;
use crate::application::OrderService;

/// Shared application state for every route handler.
pub struct AppState {
    pub order_service: Arc<OrderService>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItem>,
}

/// POST /orders
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let output = state
        .order_service
        .create_order(CreateOrderInput {
            customer_id: CustomerId::new(req.customer_id),
            items: req.items,
        })
        .await?;

    metrics::counter!("orders_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(output)))
}

#[derive(Debug, Deserialize)]
pub struct GetOrderQuery {
    #[serde(default)]
    pub include_saga_history: bool,
}

/// GET /orders/{id}?include_saga_history=bool
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<OrderId>,
    Query(query): Query<GetOrderQuery>,
) -> Result<Json<crate::application::queries::OrderSnapshot>, ServiceError> {
    let snapshot = state
        .order_service
        .get_order(GetOrderInput {
            order_id: id,
            include_saga_history: query.include_saga_history,
        })
        .await?;
    Ok(Json(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: String,
}

/// POST /orders/{id}/cancel
#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<OrderId>,
    Json(req): Json<CancelOrderRequest>,
) -> Result<Json<crate::application::commands::CancelOrderOutput>, ServiceError> {
    let output = state
        .order_service
        .cancel_order(CancelOrderInput {
            order_id: id,
            reason: req.reason,
        })
        .await?;

    metrics::counter!("orders_cancelled_total").increment(1);
    Ok(Json(output))
}

/// GET /customers/{id}/orders
#[tracing::instrument(skip(state))]
pub async fn list_for_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<crate::application::queries::GetCustomerOrdersOutput>, ServiceError> {
    let output = state
        .order_service
        .get_customer_orders(GetCustomerOrdersInput {
            customer_id: CustomerId::new(customer_id),
        })
        .await?;
    Ok(Json(output))
}

#[derive(Debug, Deserialize)]
pub struct ShipOrderRequest {
    pub tracking_number: String,
}

/// POST /orders/{id}/ship — stand-in for the external delivery dispatcher
/// spec.md §4.1/§9 leaves out of scope. Plays the `OrderShipped` event
/// through the same handler the bus subscriber uses, so the saga can be
/// driven to `SHIPPED` end-to-end without a real carrier integration.
#[tracing::instrument(skip(state, req))]
pub async fn ship(
    State(state): State<Arc<AppState>>,
    Path(id): Path<OrderId>,
    Json(req): Json<ShipOrderRequest>,
) -> Result<Json<crate::application::queries::OrderSnapshot>, ServiceError> {
    handle_order_shipped(
        &state.order_service,
        event_envelope::OrderShippedPayload {
            order_id: id,
            tracking_number: req.tracking_number,
        },
    )
    .await?;

    let snapshot = state
        .order_service
        .get_order(GetOrderInput {
            order_id: id,
            include_saga_history: false,
        })
        .await?;
    Ok(Json(snapshot))
}

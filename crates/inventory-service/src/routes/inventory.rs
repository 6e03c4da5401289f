use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{Money, OrderId, ProductId, SagaId};

use crate::application::InventoryService;
use crate::application::commands::{AllocateInventoryInput, AllocationResult, CreateProductInput};
use crate::application::queries::GetProductInput;
use crate::domain::Product;
use crate::error::ServiceError;

/// Shared application state for every route handler.
pub struct AppState {
    pub inventory_service: Arc<InventoryService>,
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateProductRequest {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sku: String,
    pub price: f64,
    pub quantity: u32,
}

/// POST /products — repository-seam endpoint for stocking a product
/// before any order references its `product_id`.
#[tracing::instrument(skip(state))]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Product>, ServiceError> {
    let product = state
        .inventory_service
        .create_product(CreateProductInput {
            id: request.id,
            name: request.name,
            description: request.description,
            sku: request.sku,
            price: Money::from_dollars(request.price),
            quantity: request.quantity,
        })
        .await?;
    Ok(Json(product))
}

/// GET /products/{id}
#[tracing::instrument(skip(state))]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ServiceError> {
    let product = state
        .inventory_service
        .get_product(GetProductInput { product_id: id })
        .await?;
    Ok(Json(product))
}

#[derive(Debug, serde::Deserialize)]
pub struct AllocateInventoryRequest {
    pub order_id: OrderId,
    #[serde(default)]
    pub saga_id: Option<SagaId>,
    pub items: HashMap<ProductId, u32>,
}

/// POST /inventory/allocate — synchronous variant of the allocation
/// command, used by callers that don't want to wait on the bus round trip
/// (spec.md §6).
#[tracing::instrument(skip(state))]
pub async fn allocate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AllocateInventoryRequest>,
) -> Result<Json<AllocationResult>, ServiceError> {
    let result = state
        .inventory_service
        .allocate_inventory(AllocateInventoryInput {
            order_id: request.order_id,
            saga_id: request.saga_id,
            items: request.items,
        })
        .await?;
    Ok(Json(result))
}

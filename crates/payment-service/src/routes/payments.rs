use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::PaymentId;

use crate::application::PaymentService;
use crate::application::queries::GetPaymentInput;
use crate::domain::Payment;
use crate::error::ServiceError;

/// Shared application state for every route handler.
pub struct AppState {
    pub payment_service: Arc<PaymentService>,
}

/// GET /payments/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PaymentId>,
) -> Result<Json<Payment>, ServiceError> {
    let payment = state
        .payment_service
        .get_payment(GetPaymentInput { payment_id: id })
        .await?;
    Ok(Json(payment))
}

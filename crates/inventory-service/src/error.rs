use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ports::{BusError, RepositoryError};
use thiserror::Error;

use crate::domain::InventoryError;

/// Top-level error for the service: wraps domain, repository, and bus
/// failures and maps each to an HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Domain(#[from] InventoryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServiceError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ServiceError::Domain(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServiceError::Repository(RepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ServiceError::Repository(_) | ServiceError::Bus(_) | ServiceError::Serialization(_) => {
                tracing::error!(error = %self, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

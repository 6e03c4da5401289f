use common::ProductId;

use crate::domain::Product;
use crate::error::ServiceError;

use super::super::InventoryService;

#[derive(Debug, Clone)]
pub struct GetProductInput {
    pub product_id: ProductId,
}

impl InventoryService {
    pub async fn get_product(&self, input: GetProductInput) -> Result<Product, ServiceError> {
        self.repository
            .find_by_id(&input.product_id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

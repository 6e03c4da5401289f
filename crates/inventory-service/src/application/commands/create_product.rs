use common::{Money, ProductId};

use crate::domain::Product;
use crate::error::ServiceError;

use super::super::InventoryService;

/// Repository-seam command used by tests and demos to stock a product
/// before an order references its `product_id` (original_source's
/// `fastapi_app.py` `create_product` returns the product directly with no
/// command handler at all; here it goes through the repository like every
/// other write).
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Money,
    pub quantity: u32,
}

impl InventoryService {
    #[tracing::instrument(skip(self), fields(product_id = %input.id))]
    pub async fn create_product(&self, input: CreateProductInput) -> Result<Product, ServiceError> {
        let product = Product::create(
            input.id,
            input.name,
            input.description,
            input.sku,
            input.price,
            input.quantity,
        )?;
        self.repository.save(&product).await?;
        Ok(product)
    }
}

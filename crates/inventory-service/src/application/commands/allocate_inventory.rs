use std::collections::HashMap;

use common::{OrderId, ProductId, SagaId};
use event_envelope::{
    EventEnvelope, EventPayload, InventoryAllocatedPayload, InventoryReleasedPayload,
};

use crate::error::ServiceError;

use super::super::InventoryService;

#[derive(Debug, Clone)]
pub struct AllocateInventoryInput {
    pub order_id: OrderId,
    pub saga_id: Option<SagaId>,
    pub items: HashMap<ProductId, u32>,
}

/// Outcome handed back to the synchronous `POST /inventory/allocate`
/// caller; the bus-driven path publishes the same data as `InventoryAllocated`
/// and discards this return value.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AllocationResult {
    pub success: bool,
    pub message: String,
    pub allocated_items: HashMap<ProductId, u32>,
}

impl InventoryService {
    /// Triggered by `InventoryRequested`, or directly by the synchronous
    /// `POST /inventory/allocate` endpoint. Iterates `items` in a stable
    /// `product_id` order for reproducibility; on any shortfall, releases
    /// everything already allocated so stock ends up exactly where it
    /// started (spec.md §4.3).
    #[tracing::instrument(skip(self), fields(order_id = %input.order_id))]
    pub async fn allocate_inventory(
        &self,
        input: AllocateInventoryInput,
    ) -> Result<AllocationResult, ServiceError> {
        let mut sorted_items: Vec<(&ProductId, &u32)> = input.items.iter().collect();
        sorted_items.sort_by(|a, b| a.0.cmp(b.0));

        let mut allocated_items: HashMap<ProductId, u32> = HashMap::new();
        let mut failed_items: HashMap<ProductId, String> = HashMap::new();

        for (product_id, &quantity) in sorted_items {
            if self.repository.find_by_id(product_id).await?.is_none() {
                failed_items.insert(product_id.clone(), format!("Product {product_id} not found"));
                continue;
            }

            if self.repository.try_allocate(product_id, quantity).await? {
                allocated_items.insert(product_id.clone(), quantity);
            } else {
                failed_items.insert(
                    product_id.clone(),
                    format!("Insufficient quantity for product {product_id}"),
                );
            }
        }

        let success = failed_items.is_empty();

        if !success && !allocated_items.is_empty() {
            for (product_id, quantity) in &allocated_items {
                self.repository.release(product_id, *quantity).await?;
            }
            let envelope = EventEnvelope::new(
                EventPayload::InventoryReleased(InventoryReleasedPayload {
                    order_id: input.order_id,
                    items: allocated_items.clone(),
                }),
                input.saga_id,
            );
            self.publish(envelope).await?;
        }

        let message = if success {
            "Inventory allocated successfully".to_string()
        } else {
            serde_json::to_string(&failed_items).unwrap_or_else(|_| "allocation failed".to_string())
        };

        let allocated_items = if success { allocated_items } else { HashMap::new() };

        let envelope = EventEnvelope::new(
            EventPayload::InventoryAllocated(InventoryAllocatedPayload {
                order_id: input.order_id,
                success,
                message: message.clone(),
                allocated_items: allocated_items.clone(),
            }),
            input.saga_id,
        );
        self.publish(envelope).await?;

        Ok(AllocationResult {
            success,
            message,
            allocated_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryProductRepository;
    use crate::domain::Product;
    use bus::InMemoryEventBus;
    use common::Money;
    use event_envelope::Topic;
    use ports::{EventBus, ProductRepository};
    use std::sync::Arc;

    async fn repo_with(products: Vec<(&str, u32)>) -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new();
        for (id, quantity) in products {
            let product = Product::create(
                ProductId::new(id),
                format!("Product {id}"),
                "",
                format!("SKU-{id}"),
                Money::from_dollars(10.0),
                quantity,
            )
            .unwrap();
            repo.save(&product).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn success_allocates_every_item() {
        let repo = Arc::new(repo_with(vec![("p1", 100), ("p2", 10)]).await);
        let bus = Arc::new(InMemoryEventBus::new());
        let service = InventoryService::new(repo.clone(), bus.clone());
        let mut sub = bus.subscribe(Topic::Inventory).await.unwrap();

        service
            .allocate_inventory(AllocateInventoryInput {
                order_id: OrderId::new(),
                saga_id: None,
                items: HashMap::from([(ProductId::new("p1"), 5), (ProductId::new("p2"), 2)]),
            })
            .await
            .unwrap();

        let envelope = sub.recv().await.unwrap();
        match envelope.payload {
            EventPayload::InventoryAllocated(p) => {
                assert!(p.success);
                assert_eq!(p.allocated_items.len(), 2);
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        let p1 = repo.find_by_id(&ProductId::new("p1")).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 95);
    }

    #[tokio::test]
    async fn partial_failure_rolls_back_every_allocation() {
        // p1 has ample stock, p2 does not: the whole command must fail and
        // leave both products exactly where they started.
        let repo = Arc::new(repo_with(vec![("p1", 100), ("p2", 10)]).await);
        let bus = Arc::new(InMemoryEventBus::new());
        let service = InventoryService::new(repo.clone(), bus.clone());
        let mut sub = bus.subscribe(Topic::Inventory).await.unwrap();

        service
            .allocate_inventory(AllocateInventoryInput {
                order_id: OrderId::new(),
                saga_id: None,
                items: HashMap::from([(ProductId::new("p1"), 5), (ProductId::new("p2"), 200)]),
            })
            .await
            .unwrap();

        // InventoryReleased is published before InventoryAllocated.
        let released = sub.recv().await.unwrap();
        assert!(matches!(released.payload, EventPayload::InventoryReleased(_)));

        let allocated = sub.recv().await.unwrap();
        match allocated.payload {
            EventPayload::InventoryAllocated(p) => {
                assert!(!p.success);
                assert!(p.allocated_items.is_empty());
                assert!(p.message.contains("Insufficient quantity for product p2"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        let p1 = repo.find_by_id(&ProductId::new("p1")).await.unwrap().unwrap();
        let p2 = repo.find_by_id(&ProductId::new("p2")).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 100, "p1 must be restored to its pre-command stock");
        assert_eq!(p2.quantity, 10);
    }

    #[tokio::test]
    async fn missing_product_is_reported_by_id() {
        let repo = Arc::new(repo_with(vec![("p1", 100)]).await);
        let bus = Arc::new(InMemoryEventBus::new());
        let service = InventoryService::new(repo, bus.clone());
        let mut sub = bus.subscribe(Topic::Inventory).await.unwrap();

        service
            .allocate_inventory(AllocateInventoryInput {
                order_id: OrderId::new(),
                saga_id: None,
                items: HashMap::from([(ProductId::new("missing"), 1)]),
            })
            .await
            .unwrap();

        let envelope = sub.recv().await.unwrap();
        match envelope.payload {
            EventPayload::InventoryAllocated(p) => {
                assert!(!p.success);
                assert!(p.message.contains("Product missing not found"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}

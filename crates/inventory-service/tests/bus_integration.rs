//! Exercises `run_event_consumer`'s wiring to the bus, as opposed to the
//! command-level unit tests in `src/application/commands/allocate_inventory.rs`,
//! which call `allocate_inventory` directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bus::InMemoryEventBus;
use common::{Money, OrderId, ProductId, SagaId};
use event_envelope::{EventEnvelope, EventPayload, InventoryRequestedPayload, Topic};
use inventory_service::adapters::InMemoryProductRepository;
use inventory_service::application::InventoryService;
use inventory_service::application::commands::CreateProductInput;
use ports::{EventBus, ProductRepository};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn inventory_requested_on_the_bus_yields_an_inventory_allocated() {
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let repo = Arc::new(InMemoryProductRepository::new());
    let service = Arc::new(InventoryService::new(repo.clone(), bus.clone()));

    service
        .create_product(CreateProductInput {
            id: ProductId::new("p1"),
            name: "Widget".to_string(),
            description: String::new(),
            sku: "SKU-1".to_string(),
            price: Money::from_dollars(10.0),
            quantity: 5,
        })
        .await
        .unwrap();

    let mut results = bus.subscribe(Topic::Inventory).await.unwrap();
    inventory_service::run_event_consumer(service, bus.clone()).await;

    let order_id = OrderId::new();
    bus.publish(EventEnvelope::new(
        EventPayload::InventoryRequested(InventoryRequestedPayload {
            order_id,
            items: HashMap::from([(ProductId::new("p1"), 3)]),
        }),
        Some(SagaId::new()),
    ))
    .await
    .unwrap();

    let envelope = tokio::time::timeout(Duration::from_secs(5), results.recv())
        .await
        .expect("timed out waiting for inventory_allocated")
        .unwrap();
    match envelope.payload {
        EventPayload::InventoryAllocated(payload) => {
            assert!(payload.success);
            assert_eq!(payload.allocated_items.get(&ProductId::new("p1")), Some(&3));
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let product = repo.find_by_id(&ProductId::new("p1")).await.unwrap().unwrap();
    assert_eq!(product.quantity, 2);
}

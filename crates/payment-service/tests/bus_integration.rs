//! Exercises `run_event_consumer`'s wiring to the bus, as opposed to the
//! command-level unit tests in `src/application/commands/*`, which call
//! `process_payment`/`refund` directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bus::InMemoryEventBus;
use common::{CustomerId, Money, OrderId, SagaId};
use event_envelope::{EventEnvelope, EventPayload, PaymentRefundRequestedPayload, PaymentRequestedPayload, Topic};
use payment_service::adapters::InMemoryPaymentRepository;
use payment_service::application::PaymentService;
use payment_service::domain::{Payment, PaymentMethod};
use ports::{ChargeOutcome, EventBus, GatewayError, PaymentGateway, PaymentRepository, RefundOutcome};

/// A gateway with a fixed outcome, so these tests don't depend on
/// `MockPaymentGateway`'s randomized success rate.
struct StubGateway {
    succeeds: bool,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn charge(&self, _amount: Money, _method: &str) -> Result<ChargeOutcome, GatewayError> {
        Ok(ChargeOutcome {
            success: self.succeeds,
            transaction_id: self.succeeds.then(|| "txn_stub".to_string()),
            failure_reason: (!self.succeeds).then(|| "card declined by issuer".to_string()),
        })
    }

    async fn refund(&self, _transaction_id: &str, _amount: Money) -> Result<RefundOutcome, GatewayError> {
        Ok(RefundOutcome { success: true, failure_reason: None })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn payment_requested_on_the_bus_yields_a_payment_processed() {
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let repo = Arc::new(InMemoryPaymentRepository::new());
    let gateway = Arc::new(StubGateway { succeeds: true });
    let service = Arc::new(PaymentService::new(repo.clone(), bus.clone(), gateway));

    let mut results = bus.subscribe(Topic::Payments).await.unwrap();
    payment_service::run_event_consumer(service.clone(), bus.clone()).await;

    let order_id = OrderId::new();
    let saga_id = SagaId::new();
    bus.publish(EventEnvelope::new(
        EventPayload::PaymentRequested(PaymentRequestedPayload {
            order_id,
            customer_id: CustomerId::new("c1"),
            amount: Money::from_dollars(40.0),
        }),
        Some(saga_id),
    ))
    .await
    .unwrap();

    let envelope = tokio::time::timeout(Duration::from_secs(5), results.recv())
        .await
        .expect("timed out waiting for payment_processed")
        .unwrap();
    match envelope.payload {
        EventPayload::PaymentProcessed(payload) => {
            assert_eq!(payload.order_id, order_id);
            assert!(payload.success);
        }
        other => panic!("unexpected payload: {other:?}"),
    }

    let stored = repo
        .find_by_order_and_saga(order_id, Some(saga_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, payment_service::domain::PaymentStatus::Completed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refund_requested_on_the_bus_refunds_the_completed_payment() {
    let bus: Arc<dyn EventBus> = Arc::new(InMemoryEventBus::new());
    let repo = Arc::new(InMemoryPaymentRepository::new());
    let gateway = Arc::new(StubGateway { succeeds: true });

    let order_id = OrderId::new();
    let saga_id = SagaId::new();
    let mut payment = Payment::new(
        order_id,
        CustomerId::new("c1"),
        Money::from_dollars(40.0),
        PaymentMethod::CreditCard,
        Some(saga_id),
    )
    .unwrap();
    payment.start_processing();
    payment.complete("txn_seed");
    repo.save(&payment).await.unwrap();

    let service = Arc::new(PaymentService::new(repo.clone(), bus.clone(), gateway));
    let mut results = bus.subscribe(Topic::Payments).await.unwrap();
    payment_service::run_event_consumer(service, bus.clone()).await;

    bus.publish(EventEnvelope::new(
        EventPayload::PaymentRefundRequested(PaymentRefundRequestedPayload {
            order_id,
            payment_id: None,
            amount: Money::from_dollars(40.0),
            reason: "inventory allocation failed".to_string(),
        }),
        Some(saga_id),
    ))
    .await
    .unwrap();

    let envelope = tokio::time::timeout(Duration::from_secs(5), results.recv())
        .await
        .expect("timed out waiting for payment_refunded")
        .unwrap();
    assert!(matches!(envelope.payload, EventPayload::PaymentRefunded(_)));

    let stored = repo.find_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, payment_service::domain::PaymentStatus::Refunded);
}

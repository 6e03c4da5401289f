use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentId, SagaId};
use ports::{PaymentRepository, RepositoryError};
use tokio::sync::RwLock;

use crate::domain::Payment;

/// In-memory payment repository, used by tests and as the default adapter
/// when no `DATABASE_URL` is configured.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    type Payment = Payment;

    async fn save(&self, payment: &Payment) -> Result<(), RepositoryError> {
        self.payments
            .write()
            .await
            .insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn find_by_order_and_saga(
        &self,
        order_id: OrderId,
        saga_id: Option<SagaId>,
    ) -> Result<Option<Payment>, RepositoryError> {
        let payments = self.payments.read().await;
        let mut matches: Vec<&Payment> = payments
            .values()
            .filter(|p| p.order_id == order_id && (saga_id.is_none() || p.saga_id == saga_id))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches.into_iter().next().cloned())
    }
}

//! Payments service: payment requests attached to messages.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentLifecycle {
    Submitted,
    Accepted,
    Processing,
    Completed,
    Errored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub requesting_entity_id: String,
    pub amount_cents: u64,
    pub currency: String,
    pub lifecycle: PaymentLifecycle,
    #[serde(default)]
    pub created_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub requesting_entity_id: String,
    pub amount_cents: u64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentsService: Send + Sync {
    async fn payment(&self, payment_id: &str) -> UpstreamResult<Payment>;
    async fn create_payment(&self, req: CreatePaymentRequest) -> UpstreamResult<Payment>;
}

pub struct NoopPaymentsService;

#[async_trait]
impl PaymentsService for NoopPaymentsService {
    async fn payment(&self, payment_id: &str) -> UpstreamResult<Payment> {
        Err(UpstreamError::not_found(payment_id))
    }

    async fn create_payment(&self, req: CreatePaymentRequest) -> UpstreamResult<Payment> {
        Err(UpstreamError::not_found(req.requesting_entity_id))
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BoxError;

/// Payment outcome for a booking, as reported by the processor callback
/// or looked up through the payment-status oracle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
    /// No settled payment on record yet.
    Pending,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Succeeded)
    }
}

/// Read-only view of the payment processor's record of truth.
#[async_trait]
pub trait PaymentOracle: Send + Sync {
    async fn payment_outcome(&self, booking_id: Uuid) -> Result<PaymentOutcome, BoxError>;
}

use aerobook_core::{BoxError, PaymentOracle, PaymentOutcome};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Reads the most recent payment row recorded for a booking.
pub struct StorePaymentOracle {
    pool: PgPool,
}

impl StorePaymentOracle {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn outcome_from_status(status: Option<&str>) -> PaymentOutcome {
    match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("succeeded") | Some("success") | Some("completed") | Some("paid") => {
            PaymentOutcome::Succeeded
        }
        Some("failed") | Some("declined") | Some("cancelled") => PaymentOutcome::Failed,
        _ => PaymentOutcome::Pending,
    }
}

#[async_trait]
impl PaymentOracle for StorePaymentOracle {
    async fn payment_outcome(&self, booking_id: Uuid) -> Result<PaymentOutcome, BoxError> {
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM payments WHERE booking_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(outcome_from_status(status.as_deref()))
    }
}

use aerobook_core::{BookingEventSink, BookingStatus, BookingStore, PaymentOutcome};
use aerobook_shared::BookingLifecycleEvent;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::events::{event_for, publish_quietly};
use crate::lifecycle::BookingLifecycle;

pub const RECORDING_DELAYED_MESSAGE: &str = "Payment processed successfully! Your booking may show as pending while we record it - please contact support if it does not update.";

/// What the traveler is told after the payment processor reports back.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentCompletion {
    /// Paid and recorded as `Confirmed`.
    Confirmed { booking_id: Uuid, message: String },
    /// Paid, but the status write did not go through. Still a successful payment.
    RecordingDelayed {
        booking_id: Uuid,
        message: String,
        reason: String,
    },
    /// Payment did not complete; the booking is left untouched.
    PaymentFailed { booking_id: Uuid, message: String },
}

impl PaymentCompletion {
    pub fn payment_succeeded(&self) -> bool {
        !matches!(self, PaymentCompletion::PaymentFailed { .. })
    }
}

/// Handles the processor's success/failure callback for a booking.
#[derive(Clone)]
pub struct CompletionHandler {
    lifecycle: BookingLifecycle,
    events: Arc<dyn BookingEventSink>,
}

impl CompletionHandler {
    pub fn new(lifecycle: BookingLifecycle, events: Arc<dyn BookingEventSink>) -> Self {
        Self { lifecycle, events }
    }

    pub async fn on_payment_result(
        &self,
        booking_id: Uuid,
        outcome: PaymentOutcome,
    ) -> PaymentCompletion {
        if !outcome.is_success() {
            info!("Payment for booking {} did not succeed ({:?})", booking_id, outcome);
            return PaymentCompletion::PaymentFailed {
                booking_id,
                message: "Payment was not completed. Please try again.".to_string(),
            };
        }

        match self
            .lifecycle
            .apply_status(booking_id, BookingStatus::Confirmed)
            .await
        {
            Ok(applied) => {
                if !applied.was_noop() {
                    if let Ok(Some(booking)) = self.lifecycle.store().get(booking_id).await {
                        publish_quietly(
                            self.events.as_ref(),
                            event_for(&booking, BookingLifecycleEvent::Confirmed),
                        )
                        .await;
                    }
                }
                PaymentCompletion::Confirmed {
                    booking_id,
                    message: "Your flight booking has been confirmed and payment processed successfully!"
                        .to_string(),
                }
            }
            Err(e) => {
                // The charge went through; only the bookkeeping lags.
                error!("Payment succeeded but booking {} status was not recorded: {}", booking_id, e);
                PaymentCompletion::RecordingDelayed {
                    booking_id,
                    message: RECORDING_DELAYED_MESSAGE.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

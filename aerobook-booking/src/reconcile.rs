use aerobook_core::{Booking, BookingEventSink, BookingStatus, PaymentOracle};
use aerobook_shared::BookingLifecycleEvent;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::events::{event_for, publish_quietly};
use crate::lifecycle::BookingLifecycle;

#[derive(Debug, Clone, Default)]
pub struct ReconciliationReport {
    /// Input bookings in their original order, with confirmed ones updated.
    pub bookings: Vec<Booking>,
    pub confirmed: Vec<Uuid>,
    /// Pending bookings whose check failed; they stay `Pending`.
    pub unreconciled: Vec<Uuid>,
}

/// Re-derives the true status of `Pending` bookings from the payment oracle.
///
/// Only ever moves a booking from `Pending` to `Confirmed`. A failed payment leaves the
/// booking `Pending`; cancelling it is the user's call.
#[derive(Clone)]
pub struct ReconciliationScanner {
    oracle: Arc<dyn PaymentOracle>,
    lifecycle: BookingLifecycle,
    events: Arc<dyn BookingEventSink>,
}

enum CheckResult {
    Confirmed(BookingStatus),
    Unchanged,
    Failed(BookingError),
}

impl ReconciliationScanner {
    pub fn new(
        oracle: Arc<dyn PaymentOracle>,
        lifecycle: BookingLifecycle,
        events: Arc<dyn BookingEventSink>,
    ) -> Self {
        Self {
            oracle,
            lifecycle,
            events,
        }
    }

    /// Check every pending booking concurrently. Never fails as a whole.
    pub async fn scan(&self, bookings: Vec<Booking>) -> ReconciliationReport {
        let checks = bookings.iter().map(|booking| async move {
            if booking.status == BookingStatus::Pending {
                self.check(booking).await
            } else {
                CheckResult::Unchanged
            }
        });
        let results = join_all(checks).await;

        let mut report = ReconciliationReport::default();
        for (mut booking, result) in bookings.into_iter().zip(results) {
            match result {
                CheckResult::Confirmed(status) => {
                    booking.status = status;
                    report.confirmed.push(booking.booking_id);
                }
                CheckResult::Unchanged => {}
                CheckResult::Failed(err) => {
                    warn!("Reconciliation skipped: {}", err);
                    report.unreconciled.push(booking.booking_id);
                }
            }
            report.bookings.push(booking);
        }

        if !report.confirmed.is_empty() {
            info!("Reconciliation confirmed {} booking(s)", report.confirmed.len());
        }
        report
    }

    async fn check(&self, booking: &Booking) -> CheckResult {
        let booking_id = booking.booking_id;
        let outcome = match self.oracle.payment_outcome(booking_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                return CheckResult::Failed(BookingError::ReconciliationCheckFailed {
                    booking_id,
                    reason: e.to_string(),
                })
            }
        };

        if !outcome.is_success() {
            return CheckResult::Unchanged;
        }

        match self
            .lifecycle
            .apply_status(booking_id, BookingStatus::Confirmed)
            .await
        {
            Ok(applied) => {
                if !applied.was_noop() {
                    let mut confirmed = booking.clone();
                    confirmed.status = applied.to;
                    publish_quietly(
                        self.events.as_ref(),
                        event_for(&confirmed, BookingLifecycleEvent::Confirmed),
                    )
                    .await;
                }
                CheckResult::Confirmed(applied.to)
            }
            Err(e) => CheckResult::Failed(BookingError::ReconciliationCheckFailed {
                booking_id,
                reason: e.to_string(),
            }),
        }
    }
}

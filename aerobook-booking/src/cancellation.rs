use aerobook_core::{Booking, BookingEventSink, BookingStatus, BookingStore};
use aerobook_shared::BookingLifecycleEvent;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::eligibility::CancellationPolicy;
use crate::error::{BookingError, BookingResult};
use crate::events::{event_for, publish_quietly};
use crate::lifecycle::BookingLifecycle;

/// Answer to the request phase: the booking may be cancelled.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationQuote {
    pub booking_id: Uuid,
    pub days_until_flight: i64,
    pub refund_notice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationOutcome {
    /// Record removed from the store.
    Deleted,
    /// Hard delete was refused; record kept with status `Cancelled`.
    SoftCancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationReceipt {
    pub booking_id: Uuid,
    pub outcome: CancellationOutcome,
    pub message: String,
}

/// Two-phase cancel: eligibility check, then hard delete with soft-cancel fallback.
#[derive(Clone)]
pub struct CancellationFlow {
    lifecycle: BookingLifecycle,
    policy: CancellationPolicy,
    clock: Arc<dyn Clock>,
    events: Arc<dyn BookingEventSink>,
}

impl CancellationFlow {
    pub fn new(
        lifecycle: BookingLifecycle,
        policy: CancellationPolicy,
        clock: Arc<dyn Clock>,
        events: Arc<dyn BookingEventSink>,
    ) -> Self {
        Self {
            lifecycle,
            policy,
            clock,
            events,
        }
    }

    pub fn policy(&self) -> &CancellationPolicy {
        &self.policy
    }

    /// Request phase. No state change either way.
    pub async fn request(&self, booking_id: Uuid) -> BookingResult<CancellationQuote> {
        let booking = self.load(booking_id).await?;
        let days_until_flight = self.eligible_days(&booking)?;

        Ok(CancellationQuote {
            booking_id,
            days_until_flight,
            refund_notice: self.policy.refund_notice.clone(),
        })
    }

    /// Confirm phase. Eligibility is evaluated again since time has moved on since the request.
    pub async fn confirm(&self, booking_id: Uuid) -> BookingResult<CancellationReceipt> {
        let booking = self.load(booking_id).await?;
        self.eligible_days(&booking)?;

        let delete_error = match self.lifecycle.store().delete(booking_id).await {
            Ok(()) => {
                info!("Booking {} deleted", booking_id);
                publish_quietly(
                    self.events.as_ref(),
                    event_for(&booking, BookingLifecycleEvent::Deleted),
                )
                .await;
                return Ok(CancellationReceipt {
                    booking_id,
                    outcome: CancellationOutcome::Deleted,
                    message: format!(
                        "Your booking has been deleted successfully. {}",
                        self.policy.refund_notice
                    ),
                });
            }
            Err(e) => {
                warn!("Delete failed for booking {}, falling back to cancel: {}", booking_id, e);
                BookingError::DeleteFailed {
                    booking_id,
                    reason: e.to_string(),
                }
            }
        };

        match self
            .lifecycle
            .apply_status(booking_id, BookingStatus::Cancelled)
            .await
        {
            Ok(_) => {
                let mut cancelled = booking;
                cancelled.status = BookingStatus::Cancelled;
                publish_quietly(
                    self.events.as_ref(),
                    event_for(&cancelled, BookingLifecycleEvent::Cancelled),
                )
                .await;
                Ok(CancellationReceipt {
                    booking_id,
                    outcome: CancellationOutcome::SoftCancelled,
                    message: format!(
                        "Your booking has been cancelled successfully. {}",
                        self.policy.refund_notice
                    ),
                })
            }
            Err(cancel_error) => Err(BookingError::SoftCancelFailed {
                booking_id,
                delete_error: Box::new(delete_error),
                cancel_error: Box::new(cancel_error),
            }),
        }
    }

    async fn load(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.lifecycle
            .store()
            .get(booking_id)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?
            .ok_or(BookingError::NotFound(booking_id))
    }

    fn eligible_days(&self, booking: &Booking) -> BookingResult<i64> {
        self.policy
            .check(booking, self.clock.now())
            .map_err(|reason| BookingError::NotEligible {
                booking_id: booking.booking_id,
                reason,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::StatusUpdateChain;
    use crate::clock::FixedClock;
    use crate::error::Ineligibility;
    use crate::memory::{InMemoryBookingStore, RecordingEventSink, StoreOp};
    use crate::testing::{new_booking, test_now};
    use aerobook_core::StrategyKind;

    fn flow_for(store: &InMemoryBookingStore, events: Arc<RecordingEventSink>) -> CancellationFlow {
        let lifecycle = BookingLifecycle::new(
            Arc::new(store.clone()),
            StatusUpdateChain::new(store.strategies()),
        );
        CancellationFlow::new(
            lifecycle,
            CancellationPolicy::default(),
            Arc::new(FixedClock(test_now())),
            events,
        )
    }

    #[tokio::test]
    async fn test_request_inside_window_is_rejected() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 2)).await.unwrap();
        let flow = flow_for(&store, Arc::new(RecordingEventSink::new()));

        let err = flow.request(booking.booking_id).await.unwrap_err();

        match err {
            BookingError::NotEligible { reason, .. } => assert_eq!(
                reason,
                Ineligibility::InsideWindow { days_until_flight: 2, min_days_before_flight: 2 }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.status_of(booking.booking_id).await, Some(BookingStatus::Pending));
    }

    #[tokio::test]
    async fn test_request_quotes_days_remaining() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 3)).await.unwrap();
        let flow = flow_for(&store, Arc::new(RecordingEventSink::new()));

        let quote = flow.request(booking.booking_id).await.unwrap();
        assert_eq!(quote.days_until_flight, 3);
    }

    #[tokio::test]
    async fn test_hard_delete_removes_record() {
        let store = InMemoryBookingStore::new();
        let events = Arc::new(RecordingEventSink::new());
        let booking = store.create(&new_booking("user-1", 10)).await.unwrap();

        let receipt = flow_for(&store, events.clone())
            .confirm(booking.booking_id)
            .await
            .unwrap();

        assert_eq!(receipt.outcome, CancellationOutcome::Deleted);
        assert!(receipt.message.contains("5-6 business days"));
        assert!(store.get(booking.booking_id).await.unwrap().is_none());
        assert_eq!(events.events().await[0].event, BookingLifecycleEvent::Deleted);
    }

    #[tokio::test]
    async fn test_delete_failure_falls_back_to_soft_cancel() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 10)).await.unwrap();
        store.fail(StoreOp::Delete).await;

        let receipt = flow_for(&store, Arc::new(RecordingEventSink::new()))
            .confirm(booking.booking_id)
            .await
            .unwrap();

        assert_eq!(receipt.outcome, CancellationOutcome::SoftCancelled);
        let stored = store.get(booking.booking_id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.amount, booking.amount);
    }

    #[tokio::test]
    async fn test_both_paths_failing_preserves_status() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 10)).await.unwrap();
        let flow = flow_for(&store, Arc::new(RecordingEventSink::new()));
        flow.lifecycle
            .apply_status(booking.booking_id, BookingStatus::Confirmed)
            .await
            .unwrap();
        store.fail(StoreOp::Delete).await;
        for kind in [StrategyKind::Primary, StrategyKind::Alternative, StrategyKind::Privileged] {
            store.fail(StoreOp::Update(kind)).await;
        }

        let err = flow.confirm(booking.booking_id).await.unwrap_err();

        match err {
            BookingError::SoftCancelFailed { delete_error, cancel_error, .. } => {
                assert!(matches!(*delete_error, BookingError::DeleteFailed { .. }));
                assert!(matches!(*cancel_error, BookingError::UpdateChannelExhausted { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.status_of(booking.booking_id).await, Some(BookingStatus::Confirmed));
    }

    #[tokio::test]
    async fn test_confirm_rechecks_eligibility() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 1)).await.unwrap();

        let err = flow_for(&store, Arc::new(RecordingEventSink::new()))
            .confirm(booking.booking_id)
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::NotEligible { .. }));
        assert_eq!(store.calls(StoreOp::Delete).await, 0);
    }
}

use aerobook_core::{
    Booking, BookingEventSink, BookingStatus, BookingStore, NewBooking, NoopEventSink,
    PaymentOracle, PaymentOutcome, StatusUpdateStrategy,
};
use aerobook_shared::BookingLifecycleEvent;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::cancellation::{CancellationFlow, CancellationQuote, CancellationReceipt};
use crate::chain::StatusUpdateChain;
use crate::clock::{Clock, SystemClock};
use crate::completion::{CompletionHandler, PaymentCompletion};
use crate::eligibility::{days_until_flight, CancellationPolicy};
use crate::error::{BookingError, BookingResult};
use crate::events::{event_for, publish_quietly};
use crate::lifecycle::{BookingLifecycle, StatusApplied};
use crate::reconcile::ReconciliationScanner;

/// A booking plus the values derived from "now" at response time.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    #[serde(flatten)]
    pub booking: Booking,
    /// Omitted for cancelled bookings.
    pub days_until_flight: Option<i64>,
    pub can_cancel: bool,
}

/// Entry point used by the outer layers. Owns the engine components and wires them to the
/// same store, strategy chain, event sink and clock.
#[derive(Clone)]
pub struct BookingService {
    lifecycle: BookingLifecycle,
    scanner: ReconciliationScanner,
    cancellation: CancellationFlow,
    completion: CompletionHandler,
    events: Arc<dyn BookingEventSink>,
    clock: Arc<dyn Clock>,
}

pub struct BookingServiceBuilder {
    store: Arc<dyn BookingStore>,
    strategies: Vec<Arc<dyn StatusUpdateStrategy>>,
    oracle: Arc<dyn PaymentOracle>,
    events: Arc<dyn BookingEventSink>,
    policy: CancellationPolicy,
    clock: Arc<dyn Clock>,
}

impl BookingServiceBuilder {
    pub fn events(mut self, events: Arc<dyn BookingEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn policy(mut self, policy: CancellationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> BookingService {
        let lifecycle = BookingLifecycle::new(self.store, StatusUpdateChain::new(self.strategies));
        BookingService {
            scanner: ReconciliationScanner::new(
                self.oracle,
                lifecycle.clone(),
                self.events.clone(),
            ),
            cancellation: CancellationFlow::new(
                lifecycle.clone(),
                self.policy,
                self.clock.clone(),
                self.events.clone(),
            ),
            completion: CompletionHandler::new(lifecycle.clone(), self.events.clone()),
            lifecycle,
            events: self.events,
            clock: self.clock,
        }
    }
}

impl BookingService {
    pub fn builder(
        store: Arc<dyn BookingStore>,
        strategies: Vec<Arc<dyn StatusUpdateStrategy>>,
        oracle: Arc<dyn PaymentOracle>,
    ) -> BookingServiceBuilder {
        BookingServiceBuilder {
            store,
            strategies,
            oracle,
            events: Arc::new(NoopEventSink),
            policy: CancellationPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub async fn create_booking(&self, request: NewBooking) -> BookingResult<Booking> {
        request.validate()?;
        let booking = self
            .lifecycle
            .store()
            .create(&request)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?;
        info!("Booking {} created for user {}", booking.booking_id, booking.user_id);
        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.lifecycle
            .store()
            .get(booking_id)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?
            .ok_or(BookingError::NotFound(booking_id))
    }

    /// Load the user's bookings and reconcile every pending one against the payment oracle.
    pub async fn get_bookings_for_user(&self, user_id: &str) -> BookingResult<Vec<Booking>> {
        let bookings = self
            .lifecycle
            .store()
            .list_by_user(user_id)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?;

        Ok(self.scanner.scan(bookings).await.bookings)
    }

    pub async fn request_cancellation(&self, booking_id: Uuid) -> BookingResult<CancellationQuote> {
        self.cancellation.request(booking_id).await
    }

    pub async fn confirm_cancellation(&self, booking_id: Uuid) -> BookingResult<CancellationReceipt> {
        self.cancellation.confirm(booking_id).await
    }

    pub async fn on_payment_result(
        &self,
        booking_id: Uuid,
        outcome: PaymentOutcome,
    ) -> PaymentCompletion {
        self.completion.on_payment_result(booking_id, outcome).await
    }

    /// Operator "Mark as Confirmed". Cancelling always goes through the eligibility-checked
    /// [`request_cancellation`](Self::request_cancellation) / [`confirm_cancellation`](Self::confirm_cancellation) pair.
    pub async fn confirm_manually(&self, booking_id: Uuid) -> BookingResult<StatusApplied> {
        let applied = self
            .lifecycle
            .apply_status(booking_id, BookingStatus::Confirmed)
            .await?;
        if !applied.was_noop() {
            if let Ok(booking) = self.get_booking(booking_id).await {
                publish_quietly(
                    self.events.as_ref(),
                    event_for(&booking, BookingLifecycleEvent::Confirmed),
                )
                .await;
            }
        }
        Ok(applied)
    }

    pub fn summarize(&self, booking: Booking) -> BookingSummary {
        let now = self.clock.now();
        let can_cancel = self.cancellation.policy().can_cancel(&booking, now);
        let days_until_flight = (booking.status != BookingStatus::Cancelled)
            .then(|| days_until_flight(booking.flight_date, now));
        BookingSummary {
            booking,
            days_until_flight,
            can_cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::memory::{InMemoryBookingStore, MockPaymentOracle, RecordingEventSink, StoreOp};
    use crate::testing::{new_booking, test_now};

    struct Fixture {
        store: InMemoryBookingStore,
        oracle: Arc<MockPaymentOracle>,
        events: Arc<RecordingEventSink>,
        service: BookingService,
    }

    fn fixture() -> Fixture {
        let store = InMemoryBookingStore::new();
        let oracle = Arc::new(MockPaymentOracle::new());
        let events = Arc::new(RecordingEventSink::new());
        let service = BookingService::builder(
            Arc::new(store.clone()),
            store.strategies(),
            oracle.clone(),
        )
        .events(events.clone())
        .clock(Arc::new(FixedClock(test_now())))
        .build();
        Fixture {
            store,
            oracle,
            events,
            service,
        }
    }

    #[tokio::test]
    async fn test_listing_reconciles_paid_bookings() {
        let f = fixture();
        let a = f.service.create_booking(new_booking("user-1", 10)).await.unwrap();
        let b = f.service.create_booking(new_booking("user-1", 20)).await.unwrap();
        f.oracle.fail_for(a.booking_id, "connection reset").await;
        f.oracle.set_outcome(b.booking_id, PaymentOutcome::Succeeded).await;

        let listed = f.service.get_bookings_for_user("user-1").await.unwrap();

        let statuses: Vec<_> = listed.iter().map(|b| b.status).collect();
        assert_eq!(statuses, vec![BookingStatus::Pending, BookingStatus::Confirmed]);

        // A later reload reflects the store.
        f.oracle.set_outcome(a.booking_id, PaymentOutcome::Pending).await;
        let reloaded = f.service.get_bookings_for_user("user-1").await.unwrap();
        assert_eq!(reloaded[1].status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_listing_fails_when_store_is_down() {
        let f = fixture();
        f.store.fail(StoreOp::List).await;
        let err = f.service.get_bookings_for_user("user-1").await.unwrap_err();
        assert!(matches!(err, BookingError::Store(_)));
    }

    #[tokio::test]
    async fn test_cancel_then_relist() {
        let f = fixture();
        let kept = f.service.create_booking(new_booking("user-1", 10)).await.unwrap();
        let removed = f.service.create_booking(new_booking("user-1", 10)).await.unwrap();

        f.service.request_cancellation(removed.booking_id).await.unwrap();
        f.service.confirm_cancellation(removed.booking_id).await.unwrap();

        let listed = f.service.get_bookings_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].booking_id, kept.booking_id);
    }

    #[tokio::test]
    async fn test_manual_confirmation_publishes_event() {
        let f = fixture();
        let booking = f.service.create_booking(new_booking("user-1", 10)).await.unwrap();

        f.service.confirm_manually(booking.booking_id).await.unwrap();
        f.service.confirm_manually(booking.booking_id).await.unwrap();

        let events = f.events.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, BookingLifecycleEvent::Confirmed);
        assert_eq!(events[0].amount, 10000);
    }

    #[tokio::test]
    async fn test_create_rejects_zero_passengers() {
        let f = fixture();
        let mut request = new_booking("user-1", 10);
        request.passenger_count = 0;
        let err = f.service.create_booking(request).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(f.store.calls(StoreOp::Create).await, 0);
    }

    #[tokio::test]
    async fn test_summary_hides_days_for_cancelled() {
        let f = fixture();
        let booking = f.service.create_booking(new_booking("user-1", 5)).await.unwrap();

        let summary = f.service.summarize(booking.clone());
        assert_eq!(summary.days_until_flight, Some(5));
        assert!(summary.can_cancel);

        let mut cancelled = booking;
        cancelled.status = BookingStatus::Cancelled;
        let summary = f.service.summarize(cancelled);
        assert_eq!(summary.days_until_flight, None);
        assert!(!summary.can_cancel);
    }

    #[tokio::test]
    async fn test_manual_confirmation_of_cancelled_booking_is_rejected() {
        let f = fixture();
        let mut booking = f.service.create_booking(new_booking("user-1", 10)).await.unwrap();
        booking.status = BookingStatus::Cancelled;
        f.store.insert(booking.clone()).await;

        let err = f.service.confirm_manually(booking.booking_id).await.unwrap_err();

        assert!(matches!(err, BookingError::TransitionRejected { .. }));
        assert_eq!(f.store.status_of(booking.booking_id).await, Some(BookingStatus::Cancelled));
    }
}

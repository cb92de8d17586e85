//! In-memory collaborators for local runs and tests.
//!
//! Every operation of [`InMemoryBookingStore`] can be made to fail on demand, which is how
//! the fallback paths (status strategies, hard delete) are exercised without a database.

use aerobook_core::{
    Booking, BookingEventSink, BookingStatus, BookingStore, BoxError, NewBooking, NoticeLedger,
    PaymentOracle, PaymentOutcome, StatusUpdateStrategy, StrategyKind,
};
use aerobook_shared::BookingEvent;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Store operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Get,
    List,
    Delete,
    Update(StrategyKind),
}

#[derive(Default)]
struct MemoryInner {
    bookings: RwLock<Vec<Booking>>,
    failing: RwLock<HashSet<StoreOp>>,
    calls: RwLock<HashMap<StoreOp, usize>>,
}

impl MemoryInner {
    async fn enter(&self, op: StoreOp) -> Result<(), BoxError> {
        *self.calls.write().await.entry(op).or_insert(0) += 1;
        if self.failing.read().await.contains(&op) {
            return Err(format!("{:?} rejected by store", op).into());
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    inner: Arc<MemoryInner>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as-is, bypassing validation.
    pub async fn insert(&self, booking: Booking) {
        let mut bookings = self.inner.bookings.write().await;
        bookings.retain(|b| b.booking_id != booking.booking_id);
        bookings.push(booking);
    }

    pub async fn fail(&self, op: StoreOp) {
        self.inner.failing.write().await.insert(op);
    }

    pub async fn recover(&self, op: StoreOp) {
        self.inner.failing.write().await.remove(&op);
    }

    pub async fn calls(&self, op: StoreOp) -> usize {
        self.inner.calls.read().await.get(&op).copied().unwrap_or(0)
    }

    pub async fn status_of(&self, booking_id: Uuid) -> Option<BookingStatus> {
        self.inner
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.booking_id == booking_id)
            .map(|b| b.status)
    }

    /// The three status-write paths, in chain order, all backed by this store.
    pub fn strategies(&self) -> Vec<Arc<dyn StatusUpdateStrategy>> {
        [StrategyKind::Primary, StrategyKind::Alternative, StrategyKind::Privileged]
            .into_iter()
            .map(|kind| {
                Arc::new(InMemoryStatusWriter {
                    kind,
                    inner: self.inner.clone(),
                }) as Arc<dyn StatusUpdateStrategy>
            })
            .collect()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create(&self, booking: &NewBooking) -> Result<Booking, BoxError> {
        self.inner.enter(StoreOp::Create).await?;
        booking.validate()?;
        let created = Booking::from_request(Uuid::new_v4(), booking)?;
        self.inner.bookings.write().await.push(created.clone());
        Ok(created)
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError> {
        self.inner.enter(StoreOp::Get).await?;
        Ok(self
            .inner
            .bookings
            .read()
            .await
            .iter()
            .find(|b| b.booking_id == booking_id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError> {
        self.inner.enter(StoreOp::List).await?;
        Ok(self
            .inner
            .bookings
            .read()
            .await
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, booking_id: Uuid) -> Result<(), BoxError> {
        self.inner.enter(StoreOp::Delete).await?;
        let mut bookings = self.inner.bookings.write().await;
        let before = bookings.len();
        bookings.retain(|b| b.booking_id != booking_id);
        if bookings.len() == before {
            return Err(format!("booking {} does not exist", booking_id).into());
        }
        Ok(())
    }
}

struct InMemoryStatusWriter {
    kind: StrategyKind,
    inner: Arc<MemoryInner>,
}

#[async_trait]
impl StatusUpdateStrategy for InMemoryStatusWriter {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn attempt(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        self.inner.enter(StoreOp::Update(self.kind)).await?;
        let mut bookings = self.inner.bookings.write().await;
        let booking = bookings
            .iter_mut()
            .find(|b| b.booking_id == booking_id)
            .ok_or_else(|| format!("booking {} does not exist", booking_id))?;
        booking.status = status;
        Ok(())
    }
}

/// Payment oracle answering from a fixed table. Unknown bookings report `Pending`.
#[derive(Default)]
pub struct MockPaymentOracle {
    outcomes: RwLock<HashMap<Uuid, Result<PaymentOutcome, String>>>,
}

impl MockPaymentOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_outcome(&self, booking_id: Uuid, outcome: PaymentOutcome) {
        self.outcomes.write().await.insert(booking_id, Ok(outcome));
    }

    pub async fn fail_for(&self, booking_id: Uuid, reason: &str) {
        self.outcomes
            .write()
            .await
            .insert(booking_id, Err(reason.to_string()));
    }
}

#[async_trait]
impl PaymentOracle for MockPaymentOracle {
    async fn payment_outcome(&self, booking_id: Uuid) -> Result<PaymentOutcome, BoxError> {
        match self.outcomes.read().await.get(&booking_id) {
            Some(Ok(outcome)) => Ok(*outcome),
            Some(Err(reason)) => Err(reason.clone().into()),
            None => Ok(PaymentOutcome::Pending),
        }
    }
}

#[derive(Default)]
pub struct InMemoryNoticeLedger {
    seen: RwLock<HashSet<(String, String)>>,
}

impl InMemoryNoticeLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoticeLedger for InMemoryNoticeLedger {
    async fn has_seen(&self, user_id: &str, notice: &str) -> Result<bool, BoxError> {
        Ok(self
            .seen
            .read()
            .await
            .contains(&(user_id.to_string(), notice.to_string())))
    }

    async fn mark_seen(&self, user_id: &str, notice: &str) -> Result<(), BoxError> {
        self.seen
            .write()
            .await
            .insert((user_id.to_string(), notice.to_string()));
        Ok(())
    }
}

/// Event sink that keeps everything it is given.
#[derive(Default)]
pub struct RecordingEventSink {
    events: RwLock<Vec<BookingEvent>>,
    unavailable: AtomicBool,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<BookingEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl BookingEventSink for RecordingEventSink {
    async fn publish(&self, event: &BookingEvent) -> Result<(), BoxError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err("event bus unavailable".into());
        }
        self.events.write().await.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::new_booking;

    #[tokio::test]
    async fn test_scripted_failures() {
        let store = InMemoryBookingStore::new();
        let booking = store.create(&new_booking("user-1", 10)).await.unwrap();

        store.fail(StoreOp::Delete).await;
        assert!(store.delete(booking.booking_id).await.is_err());
        assert_eq!(store.calls(StoreOp::Delete).await, 1);

        store.recover(StoreOp::Delete).await;
        store.delete(booking.booking_id).await.unwrap();
        assert!(store.get(booking.booking_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_user() {
        let store = InMemoryBookingStore::new();
        store.create(&new_booking("user-1", 10)).await.unwrap();
        store.create(&new_booking("user-2", 10)).await.unwrap();

        let listed = store.list_by_user("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].user_id, "user-1");
    }
}

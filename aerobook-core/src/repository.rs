use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus, NewBooking};
use crate::BoxError;

/// Repository trait for booking data access.
///
/// Status writes are deliberately absent: they go through the
/// [`StatusUpdateStrategy`] implementations so the fallback chain can pick a path.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create(&self, booking: &NewBooking) -> Result<Booking, BoxError>;

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError>;

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError>;

    /// Physically remove the record. May be rejected by the store (e.g. referential
    /// constraints), in which case callers fall back to a soft cancel.
    async fn delete(&self, booking_id: Uuid) -> Result<(), BoxError>;
}

/// Which independently-addressed update path a strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Primary,
    Alternative,
    Privileged,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Primary => "primary",
            StrategyKind::Alternative => "alternative",
            StrategyKind::Privileged => "privileged",
        };
        f.write_str(name)
    }
}

/// One way of writing a booking's status to the store.
#[async_trait]
pub trait StatusUpdateStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn attempt(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), BoxError>;
}

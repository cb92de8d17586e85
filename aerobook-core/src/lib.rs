pub mod booking;
pub mod events;
pub mod notice;
pub mod payment;
pub mod repository;

pub use booking::{Booking, BookingStatus, FlightSnapshot, NewBooking};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Error type returned by external collaborators (store, payment oracle, event bus).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use events::{BookingEventSink, NoopEventSink};
pub use notice::NoticeLedger;
pub use payment::{PaymentOracle, PaymentOutcome};
pub use repository::{BookingStore, StatusUpdateStrategy, StrategyKind};

use aerobook_core::{BookingStatus, CoreError};
use std::fmt;
use uuid::Uuid;

use crate::chain::StatusUpdateAttempt;

/// Why a cancellation request was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    AlreadyCancelled,
    /// Flight is too close (or already in the past).
    InsideWindow {
        days_until_flight: i64,
        min_days_before_flight: i64,
    },
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligibility::AlreadyCancelled => write!(f, "This booking is already cancelled."),
            Ineligibility::InsideWindow {
                days_until_flight,
                min_days_before_flight,
            } => write!(
                f,
                "Bookings can only be cancelled at least {} days before the flight. Your flight is in {} days.",
                min_days_before_flight, days_until_flight
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid state transition from {from} to {to}")]
    TransitionRejected {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("All status update strategies failed for booking {booking_id}: {last_error}")]
    UpdateChannelExhausted {
        booking_id: Uuid,
        attempts: Vec<StatusUpdateAttempt>,
        last_error: String,
    },

    #[error("{reason}")]
    NotEligible {
        booking_id: Uuid,
        reason: Ineligibility,
    },

    #[error("Failed to delete booking {booking_id}: {reason}")]
    DeleteFailed { booking_id: Uuid, reason: String },

    #[error("Failed to delete/cancel booking {booking_id}. Please try again or contact support.")]
    SoftCancelFailed {
        booking_id: Uuid,
        delete_error: Box<BookingError>,
        cancel_error: Box<BookingError>,
    },

    #[error("Payment status check failed for booking {booking_id}: {reason}")]
    ReconciliationCheckFailed { booking_id: Uuid, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Booking store error: {0}")]
    Store(String),
}

impl From<CoreError> for BookingError {
    fn from(err: CoreError) -> Self {
        BookingError::Validation(err.to_string())
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

use aerobook_core::BookingStatus;

use crate::error::{BookingError, BookingResult};

/// Result of validating a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Booking is already in the target status; nothing to write.
    Unchanged,
    Apply {
        from: BookingStatus,
        to: BookingStatus,
    },
}

/// Validate `from -> to` against the booking lifecycle.
///
/// ```text
/// Pending ──► Confirmed ──► Cancelled
///    └───────────────────────▲
/// ```
///
/// `Cancelled` is terminal. Requesting the current status is always accepted
/// as [`Transition::Unchanged`], including `Cancelled -> Cancelled`.
pub fn validate(from: BookingStatus, to: BookingStatus) -> BookingResult<Transition> {
    use BookingStatus::*;

    if from == to {
        return Ok(Transition::Unchanged);
    }

    if from.is_terminal() {
        return Err(BookingError::TransitionRejected { from, to });
    }

    match (from, to) {
        (Pending, Confirmed) | (_, Cancelled) => Ok(Transition::Apply { from, to }),
        _ => Err(BookingError::TransitionRejected { from, to }),
    }
}

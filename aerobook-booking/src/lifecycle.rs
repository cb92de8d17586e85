use aerobook_core::{BookingStatus, BookingStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::chain::{StatusUpdateAttempt, StatusUpdateChain};
use crate::error::{BookingError, BookingResult};
use crate::state_machine::{self, Transition};

/// Outcome of a successful [`BookingLifecycle::apply_status`].
#[derive(Debug, Clone, Serialize)]
pub struct StatusApplied {
    pub booking_id: Uuid,
    pub from: BookingStatus,
    pub to: BookingStatus,
    /// Empty when the booking was already in the target status.
    pub attempts: Vec<StatusUpdateAttempt>,
}

impl StatusApplied {
    pub fn was_noop(&self) -> bool {
        self.attempts.is_empty()
    }
}

/// Applies validated status transitions through the fallback chain.
#[derive(Clone)]
pub struct BookingLifecycle {
    store: Arc<dyn BookingStore>,
    chain: StatusUpdateChain,
}

impl BookingLifecycle {
    pub fn new(store: Arc<dyn BookingStore>, chain: StatusUpdateChain) -> Self {
        Self { store, chain }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Drive `booking_id` to `target`.
    ///
    /// Reads the current status from the store, validates the transition and, unless the
    /// booking is already there, runs the strategy chain. When the chain is exhausted the
    /// store's status is unchanged or unknown; nothing is retried automatically.
    pub async fn apply_status(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> BookingResult<StatusApplied> {
        let booking = self
            .store
            .get(booking_id)
            .await
            .map_err(|e| BookingError::Store(e.to_string()))?
            .ok_or(BookingError::NotFound(booking_id))?;

        let from = booking.status;
        match state_machine::validate(from, target)? {
            Transition::Unchanged => Ok(StatusApplied {
                booking_id,
                from,
                to: target,
                attempts: Vec::new(),
            }),
            Transition::Apply { from, to } => match self.chain.run(booking_id, to).await {
                Ok(attempts) => Ok(StatusApplied {
                    booking_id,
                    from,
                    to,
                    attempts,
                }),
                Err(exhausted) => {
                    error!(
                        "Status update {} -> {} exhausted for booking {}: {}",
                        from, to, booking_id, exhausted.last_error
                    );
                    Err(BookingError::UpdateChannelExhausted {
                        booking_id,
                        attempts: exhausted.attempts,
                        last_error: exhausted.last_error,
                    })
                }
            },
        }
    }
}

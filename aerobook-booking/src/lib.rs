pub mod cancellation;
pub mod chain;
pub mod clock;
pub mod completion;
pub mod eligibility;
pub mod error;
pub mod events;
pub mod filter;
pub mod lifecycle;
pub mod memory;
pub mod reconcile;
pub mod service;
pub mod state_machine;

#[cfg(test)]
mod testing;

pub use cancellation::{CancellationOutcome, CancellationQuote, CancellationReceipt};
pub use chain::{AttemptOutcome, StatusUpdateAttempt, StatusUpdateChain};
pub use clock::{Clock, FixedClock, SystemClock};
pub use completion::PaymentCompletion;
pub use eligibility::{days_until_flight, CancellationPolicy};
pub use error::{BookingError, BookingResult, Ineligibility};
pub use filter::BookingFilter;
pub use lifecycle::{BookingLifecycle, StatusApplied};
pub use reconcile::{ReconciliationReport, ReconciliationScanner};
pub use service::{BookingService, BookingSummary};

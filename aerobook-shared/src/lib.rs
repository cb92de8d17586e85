pub mod models;
pub mod redact;

pub use models::events::{BookingEvent, BookingLifecycleEvent};
pub use redact::Redacted;

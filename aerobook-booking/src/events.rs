use aerobook_core::{Booking, BookingEventSink};
use aerobook_shared::{BookingEvent, BookingLifecycleEvent};
use chrono::Utc;
use tracing::warn;

pub fn event_for(booking: &Booking, event: BookingLifecycleEvent) -> BookingEvent {
    BookingEvent {
        event,
        booking_id: booking.booking_id,
        user_id: booking.user_id.clone(),
        flight_id: booking.flight_id.clone(),
        amount: booking.amount,
        currency: booking.currency.clone(),
        timestamp: Utc::now().timestamp(),
    }
}

/// Publish without letting a bus failure leak into the booking operation.
pub async fn publish_quietly(sink: &dyn BookingEventSink, event: BookingEvent) {
    if let Err(e) = sink.publish(&event).await {
        warn!(
            "Failed to publish {} for booking {}: {}",
            event.topic(),
            event.booking_id,
            e
        );
    }
}

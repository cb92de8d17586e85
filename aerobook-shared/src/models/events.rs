use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingLifecycleEvent {
    Confirmed,
    Cancelled,
    Deleted,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingEvent {
    pub event: BookingLifecycleEvent,
    pub booking_id: Uuid,
    pub user_id: String,
    pub flight_id: String,
    pub amount: i64,
    pub currency: String,
    pub timestamp: i64,
}

impl BookingEvent {
    /// Topic the event is published on, e.g. `booking.confirmed`.
    pub fn topic(&self) -> &'static str {
        match self.event {
            BookingLifecycleEvent::Confirmed => "booking.confirmed",
            BookingLifecycleEvent::Cancelled => "booking.cancelled",
            BookingLifecycleEvent::Deleted => "booking.deleted",
        }
    }

    pub fn key(&self) -> String {
        self.booking_id.to_string()
    }
}

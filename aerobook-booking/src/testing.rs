//! Fixtures shared by the unit tests in this crate.

use aerobook_core::{Booking, FlightSnapshot, NewBooking};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

/// Reference instant for deterministic eligibility checks.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
}

/// Two passengers at 5000 per seat, flying `days_ahead` days after [`test_now`].
pub fn new_booking(user_id: &str, days_ahead: i64) -> NewBooking {
    NewBooking {
        user_id: user_id.to_string(),
        flight: FlightSnapshot {
            flight_id: "101".to_string(),
            flight_number: "AI-101".to_string(),
            departure_city: "Mumbai".to_string(),
            arrival_city: "Chennai".to_string(),
            flight_date: (test_now() + Duration::days(days_ahead)).date_naive(),
        },
        price_per_seat: 5000,
        passenger_count: 2,
        currency: "INR".to_string(),
    }
}

pub fn booking_fixture(user_id: &str, days_ahead: i64) -> Booking {
    Booking::from_request(Uuid::new_v4(), &new_booking(user_id, days_ahead)).unwrap()
}

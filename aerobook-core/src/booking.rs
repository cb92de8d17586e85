use chrono::{NaiveDate, Utc, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Booking status in the lifecycle.
///
/// Parsing is case-insensitive (`"pending"`, `"PENDING"` and `"Pending"` are all accepted);
/// serialization always produces the canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Snapshot of the selected flight, copied onto the booking at creation time.
/// It does not follow later schedule changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightSnapshot {
    pub flight_id: String,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub flight_date: NaiveDate,
}

/// A user's reservation for one flight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub booking_id: Uuid,
    pub user_id: String,
    pub status: BookingStatus,
    pub flight_id: String,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub flight_date: NaiveDate,
    pub passenger_count: u32,
    /// Per-seat price x passenger count, fixed at creation.
    pub amount: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Build the initial `Pending` record for a validated request.
    /// The store calls this once it has assigned an id.
    pub fn from_request(booking_id: Uuid, request: &NewBooking) -> CoreResult<Self> {
        let amount = request.total_amount()?;
        Ok(Self {
            booking_id,
            user_id: request.user_id.clone(),
            status: BookingStatus::Pending,
            flight_id: request.flight.flight_id.clone(),
            flight_number: request.flight.flight_number.clone(),
            departure_city: request.flight.departure_city.clone(),
            arrival_city: request.flight.arrival_city.clone(),
            flight_date: request.flight.flight_date,
            passenger_count: request.passenger_count,
            amount,
            currency: request.currency.clone(),
            created_at: Utc::now(),
        })
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Input for creating a booking, produced by the passenger-info submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
    pub user_id: String,
    pub flight: FlightSnapshot,
    pub price_per_seat: i64,
    pub passenger_count: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl NewBooking {
    pub fn validate(&self) -> CoreResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(CoreError::ValidationError("user_id is required".to_string()));
        }
        if self.passenger_count == 0 {
            return Err(CoreError::ValidationError(
                "passenger_count must be at least 1".to_string(),
            ));
        }
        if self.price_per_seat < 0 {
            return Err(CoreError::ValidationError(
                "price_per_seat must not be negative".to_string(),
            ));
        }
        self.total_amount().map(|_| ())
    }

    pub fn total_amount(&self) -> CoreResult<i64> {
        self.price_per_seat
            .checked_mul(i64::from(self.passenger_count))
            .ok_or_else(|| CoreError::ValidationError("booking amount overflows".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(price: i64, passengers: u32) -> NewBooking {
        NewBooking {
            user_id: "user-1".to_string(),
            flight: FlightSnapshot {
                flight_id: "17".to_string(),
                flight_number: "AI-202".to_string(),
                departure_city: "DEL".to_string(),
                arrival_city: "BOM".to_string(),
                flight_date: NaiveDate::from_ymd_opt(2026, 12, 25).unwrap(),
            },
            price_per_seat: price,
            passenger_count: passengers,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_status_parsing_is_case_insensitive() {
        assert_eq!("pending".parse::<BookingStatus>().unwrap(), BookingStatus::Pending);
        assert_eq!("CONFIRMED".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert_eq!(" Cancelled ".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
        assert!("refunded".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_canonically() {
        let status: BookingStatus = serde_json::from_str(r#""confirmed""#).unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""Confirmed""#);
    }

    #[test]
    fn test_amount_is_price_times_passengers() {
        let booking = Booking::from_request(Uuid::new_v4(), &request(5000, 2)).unwrap();
        assert_eq!(booking.amount, 10000);
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_validation_rejects_bad_requests() {
        assert!(request(5000, 0).validate().is_err());
        assert!(request(-1, 1).validate().is_err());
        assert!(request(i64::MAX, 2).validate().is_err());
        assert!(request(0, 1).validate().is_ok());
    }
}

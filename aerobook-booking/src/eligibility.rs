use aerobook_core::{Booking, BookingStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::error::Ineligibility;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Cancellation window settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CancellationPolicy {
    /// A booking may be cancelled only while strictly more than this many days remain.
    #[serde(default = "default_min_days")]
    pub min_days_before_flight: i64,
    #[serde(default = "default_refund_notice")]
    pub refund_notice: String,
}

fn default_min_days() -> i64 {
    2
}

fn default_refund_notice() -> String {
    "Refund will be processed within 5-6 business days.".to_string()
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            min_days_before_flight: default_min_days(),
            refund_notice: default_refund_notice(),
        }
    }
}

/// Whole days from `now` until the start (00:00 UTC) of `flight_date`, rounded up.
///
/// Negative once the flight date has passed.
pub fn days_until_flight(flight_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let departure = flight_date.and_time(NaiveTime::MIN).and_utc();
    let millis = (departure - now).num_milliseconds();
    let whole = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        whole + 1
    } else {
        whole
    }
}

impl CancellationPolicy {
    /// Evaluate eligibility for `booking` at `now`. Never cached: callers re-run it on every check.
    pub fn check(&self, booking: &Booking, now: DateTime<Utc>) -> Result<i64, Ineligibility> {
        if booking.status == BookingStatus::Cancelled {
            return Err(Ineligibility::AlreadyCancelled);
        }

        let days = days_until_flight(booking.flight_date, now);
        if days > self.min_days_before_flight {
            Ok(days)
        } else {
            Err(Ineligibility::InsideWindow {
                days_until_flight: days,
                min_days_before_flight: self.min_days_before_flight,
            })
        }
    }

    pub fn can_cancel(&self, booking: &Booking, now: DateTime<Utc>) -> bool {
        self.check(booking, now).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::{FlightSnapshot, NewBooking};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn midnight() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap()
    }

    fn booking_on(flight_date: NaiveDate, status: BookingStatus) -> Booking {
        let request = NewBooking {
            user_id: "user-1".to_string(),
            flight: FlightSnapshot {
                flight_id: "42".to_string(),
                flight_number: "6E-501".to_string(),
                departure_city: "BLR".to_string(),
                arrival_city: "GOI".to_string(),
                flight_date,
            },
            price_per_seat: 5000,
            passenger_count: 2,
            currency: "INR".to_string(),
        };
        let mut booking = Booking::from_request(Uuid::new_v4(), &request).unwrap();
        booking.status = status;
        booking
    }

    fn days_after(now: DateTime<Utc>, days: i64) -> NaiveDate {
        (now + Duration::days(days)).date_naive()
    }

    #[test]
    fn test_days_until_flight_rounds_up() {
        let now = midnight() + Duration::hours(12);
        assert_eq!(days_until_flight(days_after(midnight(), 3), now), 3);
        assert_eq!(days_until_flight(days_after(midnight(), 3), midnight()), 3);
        assert_eq!(days_until_flight(days_after(midnight(), 0), now), 0);
        assert_eq!(days_until_flight(days_after(midnight(), -2), now), -2);
    }

    #[test]
    fn test_window_boundaries() {
        let policy = CancellationPolicy::default();
        let now = midnight();

        assert!(policy.can_cancel(&booking_on(days_after(now, 3), BookingStatus::Pending), now));
        assert!(!policy.can_cancel(&booking_on(days_after(now, 2), BookingStatus::Pending), now));
        assert!(!policy.can_cancel(&booking_on(days_after(now, 0), BookingStatus::Pending), now));
        assert!(!policy.can_cancel(&booking_on(days_after(now, -5), BookingStatus::Confirmed), now));
    }

    #[test]
    fn test_confirmed_bookings_follow_the_same_rule() {
        let policy = CancellationPolicy::default();
        let now = midnight();
        assert!(policy.can_cancel(&booking_on(days_after(now, 10), BookingStatus::Confirmed), now));
    }

    #[test]
    fn test_cancelled_never_eligible() {
        let policy = CancellationPolicy::default();
        let now = midnight();
        for offset in [-3, 0, 3, 365] {
            let booking = booking_on(days_after(now, offset), BookingStatus::Cancelled);
            assert_eq!(policy.check(&booking, now), Err(Ineligibility::AlreadyCancelled));
        }
    }

    #[test]
    fn test_rejection_reports_days_remaining() {
        let policy = CancellationPolicy::default();
        let now = midnight();
        let err = policy
            .check(&booking_on(days_after(now, -1), BookingStatus::Pending), now)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bookings can only be cancelled at least 2 days before the flight. Your flight is in -1 days."
        );
    }
}

use aerobook_core::{Booking, BookingStatus};
use serde::Deserialize;

use crate::error::{BookingError, BookingResult};

/// List filter: free-text search plus an optional status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub search: Option<String>,
    /// Status name, case-insensitive. `all` or empty means no status filter.
    pub status: Option<String>,
}

impl BookingFilter {
    fn status(&self) -> BookingResult<Option<BookingStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => s.parse::<BookingStatus>().map(Some).map_err(BookingError::from),
        }
    }

    fn matches_search(booking: &Booking, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        booking.flight_number.to_lowercase().contains(&needle)
            || booking.departure_city.to_lowercase().contains(&needle)
            || booking.arrival_city.to_lowercase().contains(&needle)
            || booking.booking_id.to_string().contains(&needle)
    }

    pub fn apply(&self, bookings: Vec<Booking>) -> BookingResult<Vec<Booking>> {
        let status = self.status()?;
        let search = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        Ok(bookings
            .into_iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .filter(|b| search.map_or(true, |needle| Self::matches_search(b, needle)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::booking_fixture;

    #[test]
    fn test_search_and_status() {
        let mut goa = booking_fixture("user-1", 10);
        goa.arrival_city = "Goa".to_string();
        let mut delhi = booking_fixture("user-1", 10);
        delhi.arrival_city = "Delhi".to_string();
        delhi.status = BookingStatus::Confirmed;

        let filter = BookingFilter {
            search: Some("GOA".to_string()),
            status: None,
        };
        let found = filter.apply(vec![goa.clone(), delhi.clone()]).unwrap();
        assert_eq!(found, vec![goa.clone()]);

        let filter = BookingFilter {
            search: None,
            status: Some("confirmed".to_string()),
        };
        assert_eq!(filter.apply(vec![goa.clone(), delhi.clone()]).unwrap(), vec![delhi.clone()]);

        let filter = BookingFilter {
            search: Some("  ".to_string()),
            status: Some("all".to_string()),
        };
        assert_eq!(filter.apply(vec![goa, delhi]).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let filter = BookingFilter {
            search: None,
            status: Some("refunded".to_string()),
        };
        assert!(filter.apply(vec![]).is_err());
    }
}

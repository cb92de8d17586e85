use aerobook_core::repository::BookingStore;
use aerobook_core::{Booking, BookingStatus, BoxError, NewBooking};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const BOOKING_COLUMNS: &str = "booking_id, user_id, status, flight_id, flight_number, \
     departure_city, arrival_city, flight_date, passenger_count, amount, currency, created_at";

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    booking_id: Uuid,
    user_id: String,
    status: String,
    flight_id: String,
    flight_number: String,
    departure_city: String,
    arrival_city: String,
    flight_date: NaiveDate,
    passenger_count: i32,
    amount: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BoxError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            booking_id: row.booking_id,
            user_id: row.user_id,
            status: row.status.parse::<BookingStatus>()?,
            flight_id: row.flight_id,
            flight_number: row.flight_number,
            departure_city: row.departure_city,
            arrival_city: row.arrival_city,
            flight_date: row.flight_date,
            passenger_count: u32::try_from(row.passenger_count)?,
            amount: row.amount,
            currency: row.currency,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingStore for StoreBookingRepository {
    async fn create(&self, request: &NewBooking) -> Result<Booking, BoxError> {
        let booking = Booking::from_request(Uuid::new_v4(), request)?;
        let passenger_count = i32::try_from(booking.passenger_count)?;

        sqlx::query(
            r#"
            INSERT INTO bookings (
                booking_id, user_id, status, flight_id, flight_number, departure_city,
                arrival_city, flight_date, passenger_count, amount, currency, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(booking.booking_id)
        .bind(&booking.user_id)
        .bind(booking.status.as_str())
        .bind(&booking.flight_id)
        .bind(&booking.flight_number)
        .bind(&booking.departure_city)
        .bind(&booking.arrival_city)
        .bind(booking.flight_date)
        .bind(passenger_count)
        .bind(booking.amount)
        .bind(&booking.currency)
        .bind(booking.created_at)
        .execute(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>, BoxError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE booking_id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, BoxError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn delete(&self, booking_id: Uuid) -> Result<(), BoxError> {
        // Fails with a foreign-key violation while payments still reference the booking.
        let result = sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(format!("Booking {} not found", booking_id).into());
        }
        Ok(())
    }
}

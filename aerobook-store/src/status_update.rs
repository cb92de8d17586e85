//! The three independently-addressed status write paths, tried in order by the
//! fallback chain.

use aerobook_core::repository::{StatusUpdateStrategy, StrategyKind};
use aerobook_core::{BookingStatus, BoxError};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::booking_repo::{BookingRow, BOOKING_COLUMNS};

fn ensure_one_row(rows: u64, booking_id: Uuid) -> Result<(), BoxError> {
    if rows == 1 {
        Ok(())
    } else {
        Err(format!("Status update touched {} rows for booking {}", rows, booking_id).into())
    }
}

/// Single targeted `UPDATE` of the status column.
pub struct PrimaryStatusUpdate {
    pool: PgPool,
}

impl PrimaryStatusUpdate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusUpdateStrategy for PrimaryStatusUpdate {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Primary
    }

    async fn attempt(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE booking_id = $2",
        )
        .bind(status.as_str())
        .bind(booking_id)
        .execute(&self.pool)
        .await?;

        ensure_one_row(result.rows_affected(), booking_id)
    }
}

/// Locks and re-reads the full row inside a transaction, then writes every column back
/// with only the status changed.
pub struct AlternativeStatusUpdate {
    pool: PgPool,
}

impl AlternativeStatusUpdate {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusUpdateStrategy for AlternativeStatusUpdate {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Alternative
    }

    async fn attempt(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE booking_id = $1 FOR UPDATE",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| format!("Booking {} not found", booking_id))?;
        let current = aerobook_core::Booking::try_from(row)?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET user_id = $1, status = $2, flight_id = $3, flight_number = $4,
                departure_city = $5, arrival_city = $6, flight_date = $7,
                passenger_count = $8, amount = $9, currency = $10, updated_at = NOW()
            WHERE booking_id = $11
            "#,
        )
        .bind(&current.user_id)
        .bind(status.as_str())
        .bind(&current.flight_id)
        .bind(&current.flight_number)
        .bind(&current.departure_city)
        .bind(&current.arrival_city)
        .bind(current.flight_date)
        .bind(i32::try_from(current.passenger_count)?)
        .bind(current.amount)
        .bind(&current.currency)
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        ensure_one_row(result.rows_affected(), booking_id)?;
        tx.commit().await?;
        Ok(())
    }
}

/// Last resort: writes through the elevated-credential pool and leaves an audit row.
pub struct PrivilegedStatusUpdate {
    admin_pool: PgPool,
}

impl PrivilegedStatusUpdate {
    pub fn new(admin_pool: PgPool) -> Self {
        Self { admin_pool }
    }
}

#[async_trait]
impl StatusUpdateStrategy for PrivilegedStatusUpdate {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Privileged
    }

    async fn attempt(&self, booking_id: Uuid, status: BookingStatus) -> Result<(), BoxError> {
        let mut tx = self.admin_pool.begin().await?;

        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE booking_id = $2",
        )
        .bind(status.as_str())
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;
        ensure_one_row(result.rows_affected(), booking_id)?;

        sqlx::query(
            "INSERT INTO booking_status_audit (booking_id, status, actor) VALUES ($1, $2, $3)",
        )
        .bind(booking_id)
        .bind(status.as_str())
        .bind("privileged_status_update")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Strategies in the order the chain must try them.
pub fn status_strategies(pool: PgPool, admin_pool: PgPool) -> Vec<Arc<dyn StatusUpdateStrategy>> {
    vec![
        Arc::new(PrimaryStatusUpdate::new(pool.clone())),
        Arc::new(AlternativeStatusUpdate::new(pool)),
        Arc::new(PrivilegedStatusUpdate::new(admin_pool)),
    ]
}

use aerobook_booking::{
    BookingFilter, BookingSummary, CancellationQuote, CancellationReceipt, PaymentCompletion,
    StatusApplied,
};
use aerobook_core::{Booking, BookingStatus, NewBooking, PaymentOutcome};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const STATUS_NOTICE_KEY: &str = "booking_status_notification";
pub const STATUS_NOTICE: &str = "Your booking statuses are automatically checked against payment records. Bookings paid for will show as confirmed.";

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingSummary>,
    /// Only present the first time the user loads the list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentResultRequest {
    pub outcome: PaymentOutcome,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{id}", get(get_booking).delete(confirm_cancellation))
        .route("/v1/bookings/{id}/cancellation", post(request_cancellation))
        .route("/v1/bookings/{id}/payment-result", post(payment_result))
        .route("/v1/bookings/{id}/status", put(update_status))
        .route("/v1/users/{user_id}/bookings", get(list_user_bookings))
}

/// POST /v1/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state.bookings.create_booking(req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingSummary>, AppError> {
    let booking = state.bookings.get_booking(id).await?;
    Ok(Json(state.bookings.summarize(booking)))
}

/// GET /v1/users/{user_id}/bookings
///
/// Pending bookings are reconciled against payment records before the filter runs.
async fn list_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = state.bookings.get_bookings_for_user(&user_id).await?;
    let bookings = filter
        .apply(bookings)?
        .into_iter()
        .map(|b| state.bookings.summarize(b))
        .collect();

    let notice = first_time_notice(&state, &user_id).await;

    Ok(Json(BookingListResponse { bookings, notice }))
}

async fn first_time_notice(state: &AppState, user_id: &str) -> Option<String> {
    match state.notices.has_seen(user_id, STATUS_NOTICE_KEY).await {
        Ok(true) => None,
        Ok(false) => {
            if let Err(e) = state.notices.mark_seen(user_id, STATUS_NOTICE_KEY).await {
                tracing::warn!("Failed to record notice for {}: {}", user_id, e);
            }
            Some(STATUS_NOTICE.to_string())
        }
        Err(e) => {
            // Skip the notice rather than fail the listing.
            tracing::warn!("Notice ledger unavailable for {}: {}", user_id, e);
            None
        }
    }
}

/// POST /v1/bookings/{id}/cancellation
async fn request_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationQuote>, AppError> {
    Ok(Json(state.bookings.request_cancellation(id).await?))
}

/// DELETE /v1/bookings/{id}
async fn confirm_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationReceipt>, AppError> {
    Ok(Json(state.bookings.confirm_cancellation(id).await?))
}

/// POST /v1/bookings/{id}/payment-result
/// Called once the payment processor reports success or failure.
async fn payment_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentResultRequest>,
) -> Json<PaymentCompletion> {
    tracing::info!("Payment result {:?} received for booking {}", req.outcome, id);
    Json(state.bookings.on_payment_result(id, req.outcome).await)
}

/// PUT /v1/bookings/{id}/status
/// Only manual confirmation is accepted here.
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<StatusApplied>, AppError> {
    match req.status {
        BookingStatus::Confirmed => Ok(Json(state.bookings.confirm_manually(id).await?)),
        BookingStatus::Cancelled => Err(AppError::UnsupportedStatusChange(
            "Bookings are cancelled via POST /v1/bookings/{id}/cancellation followed by DELETE /v1/bookings/{id}"
                .to_string(),
        )),
        status => Err(AppError::UnsupportedStatusChange(format!(
            "Status cannot be set to {} manually",
            status
        ))),
    }
}

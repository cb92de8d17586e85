use aerobook_booking::BookingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("{0}")]
    UnsupportedStatusChange(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Booking(err) => {
                let status = match &err {
                    BookingError::NotFound(_) => StatusCode::NOT_FOUND,
                    BookingError::TransitionRejected { .. } => StatusCode::CONFLICT,
                    BookingError::NotEligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    BookingError::Validation(_) => StatusCode::BAD_REQUEST,
                    BookingError::UpdateChannelExhausted { .. }
                    | BookingError::SoftCancelFailed { .. }
                    | BookingError::DeleteFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    BookingError::ReconciliationCheckFailed { .. } => StatusCode::BAD_GATEWAY,
                    BookingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!("Booking request failed: {}", err);
                }
                let message = match &err {
                    BookingError::Store(_) => "Internal Server Error".to_string(),
                    other => other.to_string(),
                };
                (status, message)
            }
            AppError::UnsupportedStatusChange(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_booking::Ineligibility;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let id = Uuid::new_v4();
        let cases = [
            (BookingError::NotFound(id), StatusCode::NOT_FOUND),
            (
                BookingError::NotEligible {
                    booking_id: id,
                    reason: Ineligibility::AlreadyCancelled,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (BookingError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::Store("pool timed out".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).into_response().status(), expected);
        }
        assert_eq!(
            AppError::UnsupportedStatusChange("no".into()).into_response().status(),
            StatusCode::CONFLICT
        );
    }
}

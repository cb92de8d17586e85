use aerobook_booking::BookingService;
use aerobook_core::NoticeLedger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingService>,
    pub notices: Arc<dyn NoticeLedger>,
}

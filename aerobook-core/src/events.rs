use aerobook_shared::BookingEvent;
use async_trait::async_trait;

use crate::BoxError;

/// Outbound channel for booking lifecycle events.
#[async_trait]
pub trait BookingEventSink: Send + Sync {
    async fn publish(&self, event: &BookingEvent) -> Result<(), BoxError>;
}

/// Sink used when no event bus is configured.
pub struct NoopEventSink;

#[async_trait]
impl BookingEventSink for NoopEventSink {
    async fn publish(&self, event: &BookingEvent) -> Result<(), BoxError> {
        tracing::debug!("Dropping {} event for booking {}", event.topic(), event.booking_id);
        Ok(())
    }
}

use async_trait::async_trait;

use crate::BoxError;

/// Persistent per-user record of one-time notices already shown.
#[async_trait]
pub trait NoticeLedger: Send + Sync {
    async fn has_seen(&self, user_id: &str, notice: &str) -> Result<bool, BoxError>;

    async fn mark_seen(&self, user_id: &str, notice: &str) -> Result<(), BoxError>;
}

use aerobook_core::{BoxError, NoticeLedger};
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::info;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

fn notice_key(user_id: &str, notice: &str) -> String {
    format!("notice:{}:{}", user_id, notice)
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl NoticeLedger for RedisClient {
    async fn has_seen(&self, user_id: &str, notice: &str) -> Result<bool, BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let seen: bool = conn.exists(notice_key(user_id, notice)).await?;
        Ok(seen)
    }

    async fn mark_seen(&self, user_id: &str, notice: &str) -> Result<(), BoxError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set::<_, _, ()>(notice_key(user_id, notice), "1").await?;
        info!("Notice {} marked as seen for {}", notice, user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_key_is_per_user() {
        assert_eq!(
            notice_key("user-1", "booking_status_notification"),
            "notice:user-1:booking_status_notification"
        );
    }
}

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::CancellationConfig;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay cancellation rules stored in `business_rules` on top of the configured ones.
    pub async fn fetch_cancellation_rules(
        &self,
        defaults: CancellationConfig,
    ) -> Result<CancellationConfig, sqlx::Error> {
        let rows: Vec<(String, Value)> =
            sqlx::query_as("SELECT rule_key, rule_value FROM business_rules")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .iter()
            .fold(defaults, |rules, (key, value)| apply_rule(rules, key, value)))
    }
}

// Expected format: {"value": <number/string>}
fn apply_rule(mut rules: CancellationConfig, key: &str, value: &Value) -> CancellationConfig {
    if let Some(v) = value.get("value") {
        match key {
            "min_days_before_flight" => {
                if let Some(days) = v.as_i64() {
                    rules.min_days_before_flight = days;
                }
            }
            "refund_notice" => {
                if let Some(s) = v.as_str() {
                    rules.refund_notice = s.to_string();
                }
            }
            _ => {}
        }
    }
    rules
}

use aerobook_shared::Redacted;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub cancellation: CancellationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Redacted<String>,
    /// Elevated credentials used only by the privileged status-update path.
    pub admin_url: Redacted<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: Redacted<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KafkaConfig {
    pub brokers: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CancellationConfig {
    #[serde(default = "default_min_days_before_flight")]
    pub min_days_before_flight: i64,
    #[serde(default = "default_refund_notice")]
    pub refund_notice: String,
}

fn default_min_days_before_flight() -> i64 {
    2
}

fn default_refund_notice() -> String {
    "Refund will be processed within 5-6 business days.".to_string()
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            min_days_before_flight: default_min_days_before_flight(),
            refund_notice: default_refund_notice(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `AEROBOOK_DATABASE__URL=...`
            .add_source(config::Environment::with_prefix("AEROBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_defaults_apply() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 9000
                [database]
                url = "postgres://u:p@db/aerobook"
                admin_url = "postgres://admin:p@db/aerobook"
                [redis]
                url = "redis://cache"
                [kafka]
                brokers = "kafka:9092"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config: Config = s.try_deserialize().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cancellation.min_days_before_flight, 2);
        assert_eq!(config.database.max_connections, 5);
        assert!(!format!("{:?}", config.database).contains("admin:p"));
    }
}

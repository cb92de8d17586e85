use aerobook_api::{app, AppState};
use aerobook_booking::{BookingService, CancellationPolicy};
use aerobook_store::{
    status_strategies, Config, DbClient, EventProducer, RedisClient, StorePaymentOracle,
    StoreBookingRepository,
};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "aerobook_api=debug,aerobook_booking=debug,tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting AeroBook API on port {}", config.server.port);

    let db = DbClient::new(config.database.url.expose(), config.database.max_connections)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Separate pool with elevated credentials, only used by the last-resort status write.
    let admin_db = DbClient::new(config.database.admin_url.expose(), 1)
        .await
        .context("Failed to connect to database with admin credentials")?;

    let rules = match db.fetch_cancellation_rules(config.cancellation.clone()).await {
        Ok(rules) => rules,
        Err(e) => {
            tracing::warn!("Using configured cancellation rules, rules table unavailable: {}", e);
            config.cancellation.clone()
        }
    };
    let policy = CancellationPolicy {
        min_days_before_flight: rules.min_days_before_flight,
        refund_notice: rules.refund_notice,
    };

    let redis = RedisClient::new(config.redis.url.expose())
        .await
        .context("Failed to connect to Redis")?;

    let kafka = EventProducer::new(&config.kafka.brokers).context("Failed to create Kafka producer")?;

    let service = BookingService::builder(
        Arc::new(StoreBookingRepository::new(db.pool.clone())),
        status_strategies(db.pool.clone(), admin_db.pool.clone()),
        Arc::new(StorePaymentOracle::new(db.pool.clone())),
    )
    .events(Arc::new(kafka))
    .policy(policy)
    .build();

    let app_state = AppState {
        bookings: Arc::new(service),
        notices: Arc::new(redis),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

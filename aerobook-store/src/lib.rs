pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod payment_repo;
pub mod redis_repo;
pub mod status_update;

pub use app_config::Config;
pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use events::EventProducer;
pub use payment_repo::StorePaymentOracle;
pub use redis_repo::RedisClient;
pub use status_update::{
    status_strategies, AlternativeStatusUpdate, PrimaryStatusUpdate, PrivilegedStatusUpdate,
};

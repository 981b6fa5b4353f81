pub mod config;
pub mod models;

pub use config::{Config, QueueConfig, TransportConfig};
pub use models::PaymentPayload;

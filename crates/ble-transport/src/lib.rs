pub mod advertiser;
pub mod config;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod platform;
pub mod types;

pub use advertiser::{BleAdvertiser, RestartPolicy};
pub use config::{basic_config, payment_config, validate};
pub use driver::{BtleplugDriver, RadioDriver};
pub use error::{Result, TransportError};
pub use metrics::{AdvertisingMetrics, AdvertisingStats, AdvertisingTracker};
pub use platform::Platform;
pub use types::{AdvertiseMode, AdvertiseOutcome, AdvertisingConfig, ValidationResult};

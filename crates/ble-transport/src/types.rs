use serde::{Deserialize, Serialize};
use shared::PaymentPayload;

/// Radio advertise mode, mirroring the platform's 0-2 encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvertiseMode {
    LowPower,
    Balanced,
    LowLatency,
}

impl AdvertiseMode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AdvertiseMode::LowPower),
            1 => Some(AdvertiseMode::Balanced),
            2 => Some(AdvertiseMode::LowLatency),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            AdvertiseMode::LowPower => 0,
            AdvertiseMode::Balanced => 1,
            AdvertiseMode::LowLatency => 2,
        }
    }
}

impl std::fmt::Display for AdvertiseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvertiseMode::LowPower => write!(f, "LowPower"),
            AdvertiseMode::Balanced => write!(f, "Balanced"),
            AdvertiseMode::LowLatency => write!(f, "LowLatency"),
        }
    }
}

/// Parameters for one broadcast. Built via `config::payment_config` /
/// `config::basic_config` and treated as immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvertisingConfig {
    pub device_name: String,
    /// Service identifier, 8-4-4-4-12 hex groups
    pub service_uuid: String,
    /// Transmit power in dBm, valid range [-30, 10]
    pub tx_power_level: i8,
    pub advertise_mode: AdvertiseMode,
    /// Advertise interval in milliseconds, valid range [20, 10240]
    pub interval_ms: Option<u32>,
    pub connectable: bool,
    /// Broadcast timeout in milliseconds, 0 = unbounded
    pub timeout_ms: u32,
    pub include_device_name: bool,
    pub payload: Option<PaymentPayload>,
}

/// Aggregated result of validating an `AdvertisingConfig`
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    /// Every violated rule, in check order
    pub errors: Vec<String>,
}

/// Outcome of a start/stop operation. Failures are carried in the value,
/// never propagated as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertiseOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl AdvertiseOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

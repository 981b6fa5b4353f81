// Advertising configuration builder and validation

use crate::types::{AdvertiseMode, AdvertisingConfig, ValidationResult};
use shared::PaymentPayload;

/// Default transmit power in dBm
const DEFAULT_TX_POWER_DBM: i8 = -12;

/// Default advertise interval in milliseconds
const DEFAULT_INTERVAL_MS: u32 = 100;

/// Broadcast timeout for payment advertisements in milliseconds
const PAYMENT_TIMEOUT_MS: u32 = 60_000;

const MIN_TX_POWER_DBM: i8 = -30;
const MAX_TX_POWER_DBM: i8 = 10;
const MIN_INTERVAL_MS: u32 = 20;
const MAX_INTERVAL_MS: u32 = 10_240;

/// Build a config that broadcasts a payment payload.
///
/// Payment advertisements are bounded to 60 seconds so a wallet left on the
/// send screen does not broadcast payment details indefinitely.
pub fn payment_config(
    device_name: impl Into<String>,
    service_uuid: impl Into<String>,
    payload: PaymentPayload,
) -> AdvertisingConfig {
    AdvertisingConfig {
        device_name: device_name.into(),
        service_uuid: service_uuid.into(),
        tx_power_level: DEFAULT_TX_POWER_DBM,
        advertise_mode: AdvertiseMode::Balanced,
        interval_ms: Some(DEFAULT_INTERVAL_MS),
        connectable: true,
        timeout_ms: PAYMENT_TIMEOUT_MS,
        include_device_name: true,
        payload: Some(payload),
    }
}

/// Build a payload-less presence config with an unbounded timeout.
pub fn basic_config(
    device_name: impl Into<String>,
    service_uuid: impl Into<String>,
) -> AdvertisingConfig {
    AdvertisingConfig {
        device_name: device_name.into(),
        service_uuid: service_uuid.into(),
        tx_power_level: DEFAULT_TX_POWER_DBM,
        advertise_mode: AdvertiseMode::Balanced,
        interval_ms: Some(DEFAULT_INTERVAL_MS),
        connectable: true,
        timeout_ms: 0,
        include_device_name: true,
        payload: None,
    }
}

/// Check a config against every rule and report all violations, not just
/// the first. Deterministic, no side effects.
pub fn validate(config: &AdvertisingConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.device_name.trim().is_empty() {
        errors.push("device name must not be empty".to_string());
    }

    if config.service_uuid.trim().is_empty() {
        errors.push("service UUID must not be empty".to_string());
    } else if !is_uuid_shaped(&config.service_uuid) {
        errors.push(format!(
            "service UUID '{}' is not a valid UUID",
            config.service_uuid
        ));
    }

    if config.tx_power_level < MIN_TX_POWER_DBM || config.tx_power_level > MAX_TX_POWER_DBM {
        errors.push(format!(
            "tx power {} dBm outside [{}, {}]",
            config.tx_power_level, MIN_TX_POWER_DBM, MAX_TX_POWER_DBM
        ));
    }

    if let Some(interval) = config.interval_ms {
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&interval) {
            errors.push(format!(
                "interval {} ms outside [{}, {}]",
                interval, MIN_INTERVAL_MS, MAX_INTERVAL_MS
            ));
        }
    }

    if let Some(payload) = &config.payload {
        if payload.sender_address.trim().is_empty() {
            errors.push("payment payload wallet address must not be empty".to_string());
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// Exact 8-4-4-4-12 hex groups, case-insensitive. `uuid::Uuid::parse_str`
/// also accepts braced/urn/simple forms, which peers reject, so the shape
/// is checked by hand.
fn is_uuid_shaped(s: &str) -> bool {
    const GROUP_LENGTHS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups: Vec<&str> = s.split('-').collect();
    if groups.len() != GROUP_LENGTHS.len() {
        return false;
    }

    groups.iter().zip(GROUP_LENGTHS).all(|(group, expected)| {
        group.len() == expected && group.chars().all(|c| c.is_ascii_hexdigit())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_shape_accepts_canonical_forms() {
        assert!(is_uuid_shaped("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_uuid_shaped("123E4567-E89B-12D3-A456-426614174000"));
        assert!(is_uuid_shaped("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_uuid_shape_rejects_malformed() {
        // Missing a group
        assert!(!is_uuid_shaped("123e4567-e89b-12d3-a456"));
        // Wrong group length
        assert!(!is_uuid_shaped("123e4567-e89b-12d3-a45-426614174000"));
        // Non-hex character
        assert!(!is_uuid_shaped("123e4567-e89b-12d3-a456-42661417400g"));
        // Simple form without hyphens
        assert!(!is_uuid_shaped("123e4567e89b12d3a456426614174000"));
        // Braced form
        assert!(!is_uuid_shaped("{123e4567-e89b-12d3-a456-426614174000}"));
        assert!(!is_uuid_shaped(""));
    }
}

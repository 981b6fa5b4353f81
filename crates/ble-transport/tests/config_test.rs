use ble_transport::{basic_config, payment_config, validate, AdvertiseMode};
use rust_decimal::Decimal;
use shared::PaymentPayload;

const SERVICE_UUID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn sample_payload() -> PaymentPayload {
    PaymentPayload::new("0xa1ce0000", Decimal::new(2500, 2), "USDC", "0xb0b00000")
}

#[test]
fn test_payment_config_defaults() {
    let config = payment_config("Alice-Phone", SERVICE_UUID, sample_payload());

    assert_eq!(config.device_name, "Alice-Phone");
    assert_eq!(config.service_uuid, SERVICE_UUID);
    assert_eq!(config.tx_power_level, -12);
    assert_eq!(config.advertise_mode, AdvertiseMode::Balanced);
    assert_eq!(config.interval_ms, Some(100));
    assert!(config.connectable);
    assert_eq!(config.timeout_ms, 60_000);
    assert!(config.include_device_name);
    assert!(config.payload.is_some());
}

#[test]
fn test_basic_config_defaults() {
    let config = basic_config("Alice-Phone", SERVICE_UUID);

    assert_eq!(config.tx_power_level, -12);
    assert_eq!(config.advertise_mode, AdvertiseMode::Balanced);
    // Presence broadcasts run unbounded and carry no payment
    assert_eq!(config.timeout_ms, 0);
    assert!(config.payload.is_none());
}

#[test]
fn test_valid_payment_config_passes() {
    let config = payment_config("Alice-Phone", SERVICE_UUID, sample_payload());
    let result = validate(&config);

    assert!(result.valid);
    assert!(result.errors.is_empty());
}

#[test]
fn test_all_violations_reported() {
    let mut config = basic_config("", SERVICE_UUID);
    config.tx_power_level = 20;

    let result = validate(&config);

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].contains("device name"));
    assert!(result.errors[1].contains("tx power"));
}

#[test]
fn test_uuid_shape_enforced() {
    // Canonical and uppercase forms pass
    for uuid in [SERVICE_UUID, "123E4567-E89B-12D3-A456-426614174000"] {
        let result = validate(&basic_config("Phone", uuid));
        assert!(result.valid, "expected '{}' to be accepted", uuid);
    }

    // Missing group, bad group length, non-hex, no hyphens
    for uuid in [
        "123e4567-e89b-12d3-a456",
        "123e4567-e89b-12d3-a45-426614174000",
        "123e4567-e89b-12d3-a456-42661417400g",
        "123e4567e89b12d3a456426614174000",
    ] {
        let result = validate(&basic_config("Phone", uuid));
        assert!(!result.valid, "expected '{}' to be rejected", uuid);
        assert!(result.errors[0].contains("not a valid UUID"));
    }
}

#[test]
fn test_empty_service_uuid_reported_as_missing() {
    let result = validate(&basic_config("Phone", ""));
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("must not be empty"));
}

#[test]
fn test_interval_checked_only_when_present() {
    let mut config = basic_config("Phone", SERVICE_UUID);

    config.interval_ms = None;
    assert!(validate(&config).valid);

    for interval in [20, 10_240] {
        config.interval_ms = Some(interval);
        assert!(validate(&config).valid, "interval {} should pass", interval);
    }

    for interval in [19, 10_241] {
        config.interval_ms = Some(interval);
        let result = validate(&config);
        assert!(!result.valid, "interval {} should fail", interval);
        assert!(result.errors[0].contains("interval"));
    }
}

#[test]
fn test_tx_power_bounds() {
    let mut config = basic_config("Phone", SERVICE_UUID);

    for power in [-30, 10] {
        config.tx_power_level = power;
        assert!(validate(&config).valid, "power {} should pass", power);
    }

    for power in [-31, 11] {
        config.tx_power_level = power;
        assert!(!validate(&config).valid, "power {} should fail", power);
    }
}

#[test]
fn test_payload_wallet_address_required() {
    let mut payload = sample_payload();
    payload.sender_address = String::new();
    let config = payment_config("Phone", SERVICE_UUID, payload);

    let result = validate(&config);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("wallet address"));
}

#[test]
fn test_validate_is_deterministic() {
    let mut config = basic_config("", "not-a-uuid");
    config.tx_power_level = 42;

    let first = validate(&config);
    let second = validate(&config);
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.errors, second.errors);
}

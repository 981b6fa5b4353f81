// BLE advertising controller - drives the radio through a validated config
// with bounded automatic restart on transient failure

use crate::config;
use crate::driver::RadioDriver;
use crate::error::Result;
use crate::metrics::AdvertisingTracker;
use crate::platform::Platform;
use crate::types::{AdvertiseOutcome, AdvertisingConfig};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Message type tag in the payload-less descriptor
const MESSAGE_TYPE: &str = "AirChainPay";

/// Descriptor format version
const PROTOCOL_VERSION: &str = "1.0.0";

/// Automatic restart behaviour for a failing broadcast
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    /// Restart attempts per session before giving up
    pub max_attempts: u32,
    /// Fixed delay before each restart attempt
    pub backoff_ms: u64,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2000,
        }
    }
}

/// Broadcast when no payment payload is attached, so peers can still
/// identify the wallet out of band.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveryDescriptor<'a> {
    name: &'a str,
    service_id: &'a str,
    #[serde(rename = "type")]
    message_type: &'static str,
    version: &'static str,
    timestamp: i64,
}

/// Orchestrates start/stop/restart of a broadcast against an injected
/// radio driver, recording every attempt in the tracker.
///
/// All public operations convert failures into `AdvertiseOutcome`; nothing
/// here propagates an error to the caller.
pub struct BleAdvertiser {
    platform: Platform,
    tracker: AdvertisingTracker,
    restart_attempts: Arc<RwLock<HashMap<String, u32>>>,
    policy: RestartPolicy,
}

impl BleAdvertiser {
    pub fn new(tracker: AdvertisingTracker) -> Self {
        Self::with_platform(tracker, Platform::current())
    }

    /// Build against an explicit platform, for callers and tests that must
    /// not depend on the host OS.
    pub fn with_platform(tracker: AdvertisingTracker, platform: Platform) -> Self {
        Self {
            platform,
            tracker,
            restart_attempts: Arc::new(RwLock::new(HashMap::new())),
            policy: RestartPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RestartPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tracker(&self) -> &AdvertisingTracker {
        &self.tracker
    }

    /// Start broadcasting `config` under `session_id`.
    ///
    /// Order of checks: platform support (permanent refusal, radio never
    /// touched), config validation (all violations joined into one
    /// message), then the driver call. The outcome mirrors what was
    /// recorded in the tracker.
    pub async fn start(
        &self,
        driver: &dyn RadioDriver,
        config: &AdvertisingConfig,
        session_id: &str,
    ) -> AdvertiseOutcome {
        if !self.platform.supports_advertising() {
            warn!(
                session_id,
                platform = self.platform.name(),
                "Advertising refused: unsupported platform"
            );
            let message = "BLE advertising is only supported on Android".to_string();
            self.tracker
                .record(session_id, Utc::now(), false, Some(message.clone()), false)
                .await;
            return AdvertiseOutcome::failed(message);
        }

        let validation = config::validate(config);
        if !validation.valid {
            let message = validation.errors.join(", ");
            warn!(session_id, %message, "Advertising config rejected");
            self.tracker
                .record(session_id, Utc::now(), false, Some(message.clone()), false)
                .await;
            return AdvertiseOutcome::failed(message);
        }

        // First advertise for this session initializes its restart budget.
        // A restart re-entering here must not reset an existing counter.
        {
            let mut attempts = self.restart_attempts.write().await;
            attempts.entry(session_id.to_string()).or_insert(0);
        }

        let message = match serialize_message(config) {
            Ok(message) => message,
            Err(e) => {
                let message = e.to_string();
                self.tracker
                    .record(session_id, Utc::now(), false, Some(message.clone()), false)
                    .await;
                return AdvertiseOutcome::failed(message);
            }
        };

        debug!(session_id, bytes = message.len(), "Invoking startBroadcast");
        match driver.start_broadcast(&message).await {
            Ok(true) => {
                let payload_transmitted = config.payload.is_some();
                self.tracker
                    .record(session_id, Utc::now(), true, None, payload_transmitted)
                    .await;
                info!(session_id, payload_transmitted, "Advertising started");
                AdvertiseOutcome::ok()
            }
            Ok(false) => {
                let message = "no result from startBroadcast".to_string();
                warn!(session_id, "Driver declined broadcast");
                self.tracker
                    .record(session_id, Utc::now(), false, Some(message.clone()), false)
                    .await;
                AdvertiseOutcome::failed(message)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(session_id, error = %message, "startBroadcast failed");
                self.tracker
                    .record(session_id, Utc::now(), false, Some(message.clone()), false)
                    .await;
                AdvertiseOutcome::failed(message)
            }
        }
    }

    /// Stop the session's broadcast. The restart counter is removed before
    /// the driver call regardless of outcome: that removal is the
    /// cancellation signal for any restart waiting out its backoff.
    pub async fn stop(&self, driver: &dyn RadioDriver, session_id: &str) -> AdvertiseOutcome {
        {
            let mut attempts = self.restart_attempts.write().await;
            attempts.remove(session_id);
        }

        match driver.stop_broadcast().await {
            Ok(true) => {
                self.tracker.mark_stopped(session_id, Utc::now()).await;
                info!(session_id, "Advertising stopped");
                AdvertiseOutcome::ok()
            }
            Ok(false) => {
                warn!(session_id, "Driver declined stop");
                AdvertiseOutcome::failed("no result from stopBroadcast")
            }
            Err(e) => {
                let message = e.to_string();
                warn!(session_id, error = %message, "stopBroadcast failed");
                AdvertiseOutcome::failed(message)
            }
        }
    }

    /// Retry a failed broadcast after a fixed backoff, at most
    /// `policy.max_attempts` times per session. Returns the retried start's
    /// success; `false` when the budget is exhausted or the session was
    /// stopped while backing off.
    pub async fn restart_if_needed(
        &self,
        driver: &dyn RadioDriver,
        config: &AdvertisingConfig,
        session_id: &str,
    ) -> bool {
        // Restarts only address transient driver failures; a platform
        // refusal is permanent and consumes no budget.
        if !self.platform.supports_advertising() {
            debug!(session_id, "Restart skipped: platform cannot advertise");
            return false;
        }

        let attempts = {
            let attempts = self.restart_attempts.read().await;
            attempts.get(session_id).copied().unwrap_or(0)
        };

        if attempts >= self.policy.max_attempts {
            warn!(session_id, attempts, "Restart budget exhausted");
            let mut attempts = self.restart_attempts.write().await;
            attempts.remove(session_id);
            return false;
        }

        {
            let mut map = self.restart_attempts.write().await;
            map.insert(session_id.to_string(), attempts + 1);
        }
        debug!(
            session_id,
            attempt = attempts + 1,
            backoff_ms = self.policy.backoff_ms,
            "Restarting after backoff"
        );

        sleep(Duration::from_millis(self.policy.backoff_ms)).await;

        // A stop issued during the backoff removed the counter; bail out
        // rather than firing a stale restart.
        {
            let attempts = self.restart_attempts.read().await;
            if !attempts.contains_key(session_id) {
                debug!(session_id, "Restart cancelled while backing off");
                return false;
            }
        }

        let outcome = self.start(driver, config, session_id).await;
        if outcome.success {
            self.tracker.increment_restart(session_id).await;
            info!(session_id, "Advertising restarted");
        }
        outcome.success
    }
}

/// Serialize the advertising message: the payment payload alone when one is
/// attached, otherwise the discovery descriptor.
fn serialize_message(config: &AdvertisingConfig) -> Result<String> {
    match &config.payload {
        Some(payload) => Ok(serde_json::to_string(payload)?),
        None => {
            let descriptor = DiscoveryDescriptor {
                name: &config.device_name,
                service_id: &config.service_uuid,
                message_type: MESSAGE_TYPE,
                version: PROTOCOL_VERSION,
                timestamp: Utc::now().timestamp_millis(),
            };
            Ok(serde_json::to_string(&descriptor)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::basic_config;

    #[test]
    fn test_descriptor_wire_format() {
        let config = basic_config("Alice-Phone", "123e4567-e89b-12d3-a456-426614174000");
        let message = serialize_message(&config).unwrap();

        let value: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(value["name"], "Alice-Phone");
        assert_eq!(value["serviceId"], "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(value["type"], "AirChainPay");
        assert_eq!(value["version"], "1.0.0");
        assert!(value["timestamp"].as_i64().unwrap() > 0);
    }
}

// Radio driver seam between the controller and the BLE stack

use crate::error::{Result, TransportError};
use async_trait::async_trait;
use btleplug::api::{Central as _, Manager as _};
use btleplug::platform::{Adapter, Manager};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Capability consumed by the advertising controller.
///
/// `Ok(true)` means the radio accepted the broadcast, `Ok(false)` means it
/// declined without an error, `Err` means it malfunctioned. The controller
/// currently treats the last two alike, but the seam keeps both signals so
/// callers can tell them apart later.
#[async_trait]
pub trait RadioDriver: Send + Sync {
    /// Begin broadcasting the serialized advertising message
    async fn start_broadcast(&self, message: &str) -> Result<bool>;

    /// Stop the active broadcast
    async fn stop_broadcast(&self) -> Result<bool>;
}

/// Default driver backed by btleplug.
///
/// btleplug exposes no peripheral mode on most platforms, so the actual
/// transmission is carried by the platform advertiser (Android
/// BluetoothLeAdvertiser); this driver tracks broadcast state and validates
/// that an adapter is present.
pub struct BtleplugDriver {
    adapter: Adapter,
    is_broadcasting: Arc<RwLock<bool>>,
}

impl BtleplugDriver {
    /// Create a driver bound to the first available BLE adapter
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await.map_err(|e| {
            TransportError::AdapterError(format!("Failed to create BLE manager: {}", e))
        })?;

        let adapters = manager.adapters().await.map_err(|e| {
            TransportError::AdapterError(format!("Failed to get BLE adapters: {}", e))
        })?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::AdapterError("No BLE adapter found".to_string()))?;

        Ok(Self {
            adapter,
            is_broadcasting: Arc::new(RwLock::new(false)),
        })
    }

    /// Human-readable description of the underlying adapter
    pub async fn adapter_info(&self) -> Result<String> {
        self.adapter.adapter_info().await.map_err(|e| {
            TransportError::AdapterError(format!("Failed to read adapter info: {}", e))
        })
    }

    pub async fn is_broadcasting(&self) -> bool {
        *self.is_broadcasting.read().await
    }
}

#[async_trait]
impl RadioDriver for BtleplugDriver {
    async fn start_broadcast(&self, message: &str) -> Result<bool> {
        let mut is_broadcasting = self.is_broadcasting.write().await;
        if *is_broadcasting {
            warn!("BLE broadcast already active");
            return Ok(true);
        }

        info!(bytes = message.len(), "Starting BLE broadcast");

        // Peripheral mode is unavailable through btleplug; the platform
        // advertiser performs the transmission. State is tracked here so
        // stop/restart bookkeeping stays consistent.
        warn!("BLE peripheral mode not supported by btleplug - platform advertiser carries the broadcast");

        *is_broadcasting = true;
        Ok(true)
    }

    async fn stop_broadcast(&self) -> Result<bool> {
        let mut is_broadcasting = self.is_broadcasting.write().await;
        if !*is_broadcasting {
            warn!("stop_broadcast called with no active broadcast");
            return Ok(false);
        }

        info!("Stopping BLE broadcast");
        *is_broadcasting = false;
        Ok(true)
    }
}

//! Error types for the BLE advertising transport

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while driving the radio
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("BLE adapter error: {0}")]
    AdapterError(String),

    #[error("Broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error("BLE advertising is only supported on Android")]
    UnsupportedPlatform,

    #[error("Invalid advertising config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::SerializationError(err.to_string())
    }
}

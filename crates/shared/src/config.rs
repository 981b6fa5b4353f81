use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Advertising transport settings
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Maximum automatic restart attempts per session
    pub max_restart_attempts: u32,
    /// Fixed delay before each restart attempt
    pub restart_backoff_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_restart_attempts: 3,
            restart_backoff_ms: 2000,
        }
    }
}

/// Offline payment queue settings
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Submission retries per entry before it is marked failed
    pub max_retries: u32,
    /// Default time-to-live for queued payments, in seconds
    pub default_ttl_secs: i64,
    /// Path for the durable store; in-memory when absent
    pub storage_path: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            default_ttl_secs: 24 * 60 * 60,
            storage_path: None,
        }
    }
}

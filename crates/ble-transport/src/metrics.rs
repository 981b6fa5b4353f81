// Advertising session tracker - per-session lifecycle metrics
//
// The tracker exclusively owns all session records. Recording is best-effort
// bookkeeping: no operation here can fail the caller's advertise attempt.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Lifecycle metrics for one advertising session
#[derive(Debug, Clone, Serialize)]
pub struct AdvertisingMetrics {
    pub start_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    /// stop - start in milliseconds, 0 until the session is stopped
    pub duration_ms: i64,
    pub success: bool,
    pub error: Option<String>,
    pub error_count: u32,
    pub restart_count: u32,
    pub payload_transmitted: bool,
}

/// Aggregates over all currently tracked sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvertisingStats {
    pub total_sessions: usize,
    pub successful_sessions: usize,
    pub failed_sessions: usize,
    pub average_duration_ms: f64,
    pub total_restarts: u64,
    pub payload_transmission_count: usize,
}

/// Tracks advertising sessions keyed by caller-supplied session id.
///
/// Explicitly constructed and injectable; clones share the same store so a
/// controller and its owner observe the same records.
#[derive(Clone)]
pub struct AdvertisingTracker {
    sessions: Arc<RwLock<HashMap<String, AdvertisingMetrics>>>,
}

impl AdvertisingTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace the record for `session_id`. Starting a session
    /// resets its history; this is the only way a record is created.
    pub async fn record(
        &self,
        session_id: &str,
        start_time: DateTime<Utc>,
        success: bool,
        error: Option<String>,
        payload_transmitted: bool,
    ) {
        let metrics = AdvertisingMetrics {
            start_time,
            stop_time: None,
            duration_ms: 0,
            success,
            error_count: if error.is_some() { 1 } else { 0 },
            error,
            restart_count: 0,
            payload_transmitted,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id.to_string(), metrics);
        debug!(session_id, success, "Recorded advertising attempt");
    }

    /// Set the stop time and derived duration. No-op when the session is
    /// unknown.
    pub async fn mark_stopped(&self, session_id: &str, stop_time: DateTime<Utc>) {
        let mut sessions = self.sessions.write().await;
        if let Some(metrics) = sessions.get_mut(session_id) {
            metrics.stop_time = Some(stop_time);
            metrics.duration_ms = (stop_time - metrics.start_time).num_milliseconds();
            debug!(session_id, duration_ms = metrics.duration_ms, "Session stopped");
        }
    }

    /// Count one successful automatic restart. No-op when the session is
    /// unknown.
    pub async fn increment_restart(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(metrics) = sessions.get_mut(session_id) {
            metrics.restart_count += 1;
        }
    }

    pub async fn get(&self, session_id: &str) -> Option<AdvertisingMetrics> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Point-in-time copy of every record; later mutations are not visible
    /// through it.
    pub async fn get_all(&self) -> HashMap<String, AdvertisingMetrics> {
        let sessions = self.sessions.read().await;
        sessions.clone()
    }

    /// Remove one session's record. Idempotent.
    pub async fn clear(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }

    pub async fn clear_all(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.clear();
    }

    /// Aggregate over all current records. All-zero on an empty store.
    pub async fn statistics(&self) -> AdvertisingStats {
        let sessions = self.sessions.read().await;

        let total_sessions = sessions.len();
        if total_sessions == 0 {
            return AdvertisingStats::default();
        }

        let successful_sessions = sessions.values().filter(|m| m.success).count();
        let total_duration_ms: i64 = sessions.values().map(|m| m.duration_ms).sum();
        let total_restarts: u64 = sessions.values().map(|m| u64::from(m.restart_count)).sum();
        let payload_transmission_count = sessions
            .values()
            .filter(|m| m.payload_transmitted)
            .count();

        AdvertisingStats {
            total_sessions,
            successful_sessions,
            failed_sessions: total_sessions - successful_sessions,
            average_duration_ms: total_duration_ms as f64 / total_sessions as f64,
            total_restarts,
            payload_transmission_count,
        }
    }
}

impl Default for AdvertisingTracker {
    fn default() -> Self {
        Self::new()
    }
}

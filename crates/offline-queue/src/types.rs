use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a queued payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Waiting for a flush
    Pending,
    /// Claimed by a flush, submission in flight
    Sending,
    /// Submitted to the chain relay
    Sent,
    /// Retry budget exhausted
    Failed,
    /// Aged out before it could be sent
    Expired,
}

impl PaymentStatus {
    /// Terminal entries are retained for history but never retried
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Sent | PaymentStatus::Failed | PaymentStatus::Expired
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Sending => write!(f, "Sending"),
            PaymentStatus::Sent => write!(f, "Sent"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Expired => write!(f, "Expired"),
        }
    }
}

/// A payment intent created while offline, owned by the queue from enqueue
/// until it reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedPayment {
    pub id: Uuid,
    /// Queue-assigned, strictly increasing; flush order follows it
    pub sequence: u64,
    /// Serialized signed transaction / payment payload
    pub serialized_tx: String,
    /// Target chain identifier
    pub chain_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub retry_count: u32,
    pub status: PaymentStatus,
}

/// Per-flush outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub failed: usize,
    pub expired: usize,
}

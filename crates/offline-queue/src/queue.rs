// Offline payment queue - durable store-and-forward for payment intents
// created without connectivity, replayed with bounded retry once online

use crate::error::{QueueError, Result};
use crate::types::{FlushReport, PaymentStatus, QueuedPayment};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::PaymentPayload;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Pending entries allowed before enqueue refuses
const DEFAULT_MAX_QUEUE_SIZE: usize = 1000;

/// Chain submission capability, opaque beyond its success/failure outcome
#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    async fn submit(&self, payment: &QueuedPayment) -> Result<()>;
}

/// Storage backend for queued payments
enum QueueBackend {
    Memory(Vec<QueuedPayment>),
    Persistent(sled::Db),
}

impl QueueBackend {
    fn insert(&mut self, payment: &QueuedPayment) -> Result<()> {
        match self {
            QueueBackend::Memory(entries) => {
                entries.push(payment.clone());
                Ok(())
            }
            QueueBackend::Persistent(db) => {
                let bytes = bincode::serialize(payment)?;
                db.insert(entry_key(payment), bytes)?;
                db.flush()?;
                Ok(())
            }
        }
    }

    fn update(&mut self, payment: &QueuedPayment) -> Result<()> {
        match self {
            QueueBackend::Memory(entries) => {
                if let Some(entry) = entries.iter_mut().find(|e| e.id == payment.id) {
                    *entry = payment.clone();
                }
                Ok(())
            }
            QueueBackend::Persistent(db) => {
                let bytes = bincode::serialize(payment)?;
                db.insert(entry_key(payment), bytes)?;
                db.flush()?;
                Ok(())
            }
        }
    }

    /// All entries in enqueue order
    fn all(&self) -> Result<Vec<QueuedPayment>> {
        match self {
            QueueBackend::Memory(entries) => Ok(entries.clone()),
            QueueBackend::Persistent(db) => {
                // Big-endian sequence keys make sled's lexicographic
                // iteration the enqueue order.
                let mut entries = Vec::new();
                for item in db.iter() {
                    let (_, value) = item?;
                    entries.push(bincode::deserialize(&value)?);
                }
                Ok(entries)
            }
        }
    }
}

/// sled key: big-endian sequence number, so iteration order is FIFO
fn entry_key(payment: &QueuedPayment) -> [u8; 8] {
    payment.sequence.to_be_bytes()
}

/// Outcome of the claim step inside a flush pass
enum Claimed {
    Entry(QueuedPayment),
    Expired,
    None,
}

/// Durable FIFO queue of payment intents.
///
/// Entries move `Pending -> Sending -> {Sent | Pending | Failed}` atomically
/// under the backend lock; the `Sending` claim is what keeps two concurrent
/// flushes from double-submitting an entry. `flush` never returns an error:
/// per-entry failures are isolated so one bad entry cannot block the rest.
pub struct OfflineQueue {
    backend: Mutex<QueueBackend>,
    next_sequence: AtomicU64,
    max_retries: u32,
    max_queue_size: usize,
}

impl OfflineQueue {
    /// In-memory queue, for tests and ephemeral sessions
    pub fn new(max_retries: u32) -> Self {
        Self {
            backend: Mutex::new(QueueBackend::Memory(Vec::new())),
            next_sequence: AtomicU64::new(0),
            max_retries,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        }
    }

    /// Queue backed by a sled tree at `path`. Entries survive restarts;
    /// entries left `Sending` by a crash are reset to `Pending` so they are
    /// retried rather than stranded.
    pub fn persistent(path: &str, max_retries: u32) -> Result<Self> {
        let db = sled::open(path)?;

        let mut next_sequence = 0u64;
        let mut stranded = Vec::new();
        for item in db.iter() {
            let (_, value) = item?;
            let payment: QueuedPayment = bincode::deserialize(&value)?;
            next_sequence = next_sequence.max(payment.sequence + 1);
            if payment.status == PaymentStatus::Sending {
                stranded.push(payment);
            }
        }
        for mut payment in stranded {
            warn!(id = %payment.id, "Resetting payment stranded mid-send");
            payment.status = PaymentStatus::Pending;
            let bytes = bincode::serialize(&payment)?;
            db.insert(entry_key(&payment), bytes)?;
        }
        db.flush()?;

        Ok(Self {
            backend: Mutex::new(QueueBackend::Persistent(db)),
            next_sequence: AtomicU64::new(next_sequence),
            max_retries,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
        })
    }

    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Persist a new payment intent with status `Pending` and
    /// `expires_at = now + ttl`.
    pub async fn enqueue(
        &self,
        payload: &PaymentPayload,
        chain_id: &str,
        ttl: Duration,
    ) -> Result<QueuedPayment> {
        let serialized_tx = serde_json::to_string(payload)?;
        let now = Utc::now();

        let mut backend = self.backend.lock().await;

        let pending = backend
            .all()?
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .count();
        if pending >= self.max_queue_size {
            warn!(pending, "Offline queue full, refusing payment");
            return Err(QueueError::QueueFull(self.max_queue_size));
        }

        let payment = QueuedPayment {
            id: Uuid::new_v4(),
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
            serialized_tx,
            chain_id: chain_id.to_string(),
            created_at: now,
            expires_at: now + ttl,
            retry_count: 0,
            status: PaymentStatus::Pending,
        };
        backend.insert(&payment)?;

        info!(id = %payment.id, chain_id, "Queued offline payment");
        Ok(payment)
    }

    /// Flush using the current time. See `flush_at`.
    pub async fn flush(&self, submitter: &dyn ChainSubmitter) -> FlushReport {
        self.flush_at(Utc::now(), submitter).await
    }

    /// Attempt every pending entry once, oldest first. Entries past their
    /// expiry are marked `Expired` without a submission; submission failures
    /// either revert the entry to `Pending` for a later flush or mark it
    /// `Failed` once the retry budget is spent.
    pub async fn flush_at(
        &self,
        now: DateTime<Utc>,
        submitter: &dyn ChainSubmitter,
    ) -> FlushReport {
        let mut report = FlushReport::default();
        // Entries this pass has already touched; a reverted entry waits for
        // a later flush instead of being retried in a tight loop here.
        let mut attempted: HashSet<Uuid> = HashSet::new();

        loop {
            let claimed = {
                let mut backend = self.backend.lock().await;
                match claim_next(&mut backend, now, &attempted) {
                    Ok(claimed) => claimed,
                    Err(e) => {
                        error!(error = %e, "Storage error during flush, aborting pass");
                        break;
                    }
                }
            };

            let mut payment = match claimed {
                Claimed::None => break,
                Claimed::Expired => {
                    report.expired += 1;
                    continue;
                }
                Claimed::Entry(payment) => payment,
            };
            attempted.insert(payment.id);

            // Submission happens without holding the backend lock
            let submitted = submitter.submit(&payment).await;

            match submitted {
                Ok(()) => {
                    payment.status = PaymentStatus::Sent;
                    report.sent += 1;
                    info!(id = %payment.id, chain_id = %payment.chain_id, "Offline payment sent");
                }
                Err(e) => {
                    payment.retry_count += 1;
                    report.failed += 1;
                    if payment.retry_count > self.max_retries {
                        payment.status = PaymentStatus::Failed;
                        warn!(
                            id = %payment.id,
                            retries = payment.retry_count,
                            error = %e,
                            "Offline payment permanently failed"
                        );
                    } else {
                        payment.status = PaymentStatus::Pending;
                        debug!(
                            id = %payment.id,
                            retries = payment.retry_count,
                            error = %e,
                            "Submission failed, will retry on a later flush"
                        );
                    }
                }
            }

            let mut backend = self.backend.lock().await;
            if let Err(e) = backend.update(&payment) {
                error!(id = %payment.id, error = %e, "Failed to persist flush outcome");
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            expired = report.expired,
            "Flush complete"
        );
        report
    }

    /// Mark aged-out pending entries `Expired` without submitting them.
    /// Returns how many were expired.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut backend = self.backend.lock().await;
        let mut expired = 0;

        for mut payment in backend.all()? {
            if payment.status == PaymentStatus::Pending && now > payment.expires_at {
                payment.status = PaymentStatus::Expired;
                backend.update(&payment)?;
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, "Expired stale offline payments");
        }
        Ok(expired)
    }

    /// Snapshot of entries still waiting for a flush, oldest first
    pub async fn list_pending(&self) -> Result<Vec<QueuedPayment>> {
        let backend = self.backend.lock().await;
        Ok(backend
            .all()?
            .into_iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .collect())
    }

    /// Snapshot of terminal entries (sent, failed, expired), oldest first
    pub async fn list_history(&self) -> Result<Vec<QueuedPayment>> {
        let backend = self.backend.lock().await;
        Ok(backend
            .all()?
            .into_iter()
            .filter(|p| p.status.is_terminal())
            .collect())
    }

    /// Total entries, terminal included
    pub async fn len(&self) -> Result<usize> {
        let backend = self.backend.lock().await;
        Ok(backend.all()?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Claim the oldest pending entry this pass has not touched. Expired
/// entries are marked inside the lock; live ones move to `Sending` so a
/// concurrent flush skips them.
fn claim_next(
    backend: &mut QueueBackend,
    now: DateTime<Utc>,
    attempted: &HashSet<Uuid>,
) -> Result<Claimed> {
    for mut payment in backend.all()? {
        if payment.status != PaymentStatus::Pending || attempted.contains(&payment.id) {
            continue;
        }

        if now > payment.expires_at {
            payment.status = PaymentStatus::Expired;
            backend.update(&payment)?;
            debug!(id = %payment.id, "Payment expired before submission");
            return Ok(Claimed::Expired);
        }

        payment.status = PaymentStatus::Sending;
        backend.update(&payment)?;
        return Ok(Claimed::Entry(payment));
    }

    Ok(Claimed::None)
}

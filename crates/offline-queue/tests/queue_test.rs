use async_trait::async_trait;
use chrono::{Duration, Utc};
use offline_queue::{
    ChainSubmitter, OfflineQueue, PaymentStatus, QueueError, QueuedPayment,
};
use rust_decimal::Decimal;
use shared::PaymentPayload;
use std::sync::Arc;
use std::sync::Mutex;
use uuid::Uuid;

/// Submitter that records every submission and fails on demand
struct RecordingSubmitter {
    submitted: Mutex<Vec<Uuid>>,
    fail_chain: Option<String>,
    delay_ms: u64,
}

impl RecordingSubmitter {
    fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            fail_chain: None,
            delay_ms: 0,
        }
    }

    fn failing_for(chain_id: &str) -> Self {
        Self {
            fail_chain: Some(chain_id.to_string()),
            ..Self::new()
        }
    }

    fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    fn submitted(&self) -> Vec<Uuid> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainSubmitter for RecordingSubmitter {
    async fn submit(&self, payment: &QueuedPayment) -> offline_queue::Result<()> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.submitted.lock().unwrap().push(payment.id);

        match &self.fail_chain {
            Some(chain) if chain == &payment.chain_id => {
                Err(QueueError::SubmissionFailed("relay unreachable".to_string()))
            }
            _ => Ok(()),
        }
    }
}

fn payload() -> PaymentPayload {
    PaymentPayload::new("0xa1ce0000", Decimal::new(2500, 2), "USDC", "0xb0b00000")
}

#[tokio::test]
async fn test_enqueue_creates_pending_entry() {
    let queue = OfflineQueue::new(3);
    let before = Utc::now();

    let payment = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.retry_count, 0);
    assert_eq!(payment.chain_id, "base-sepolia");
    assert!(payment.serialized_tx.contains("senderAddress"));
    assert!(payment.expires_at >= before + Duration::seconds(3600));

    let pending = queue.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, payment.id);
}

#[tokio::test]
async fn test_flush_is_fifo_and_expires_stale_entries() {
    let queue = OfflineQueue::new(3);

    // Already expired at enqueue time
    let expired = queue
        .enqueue(&payload(), "base-sepolia", Duration::milliseconds(-1))
        .await
        .unwrap();
    let second = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(1000))
        .await
        .unwrap();
    let third = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(1000))
        .await
        .unwrap();

    let submitter = RecordingSubmitter::new();
    let report = queue.flush(&submitter).await;

    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.expired, 1);

    // The expired entry never reached the submitter; the rest went oldest first
    assert_eq!(submitter.submitted(), vec![second.id, third.id]);

    let history = queue.list_history().await.unwrap();
    let expired_entry = history.iter().find(|p| p.id == expired.id).unwrap();
    assert_eq!(expired_entry.status, PaymentStatus::Expired);
}

#[tokio::test]
async fn test_retry_budget_then_terminal_failure() {
    let queue = OfflineQueue::new(2);
    let payment = queue
        .enqueue(&payload(), "bad-chain", Duration::seconds(3600))
        .await
        .unwrap();

    let submitter = RecordingSubmitter::failing_for("bad-chain");

    // Each flush attempts the entry once, then reverts it to pending
    for expected_retries in [1, 2] {
        let report = queue.flush(&submitter).await;
        assert_eq!(report.failed, 1);
        let pending = queue.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].retry_count, expected_retries);
    }

    // Third failure exceeds max_retries = 2: terminal
    let report = queue.flush(&submitter).await;
    assert_eq!(report.failed, 1);
    assert!(queue.list_pending().await.unwrap().is_empty());

    let history = queue.list_history().await.unwrap();
    let failed = history.iter().find(|p| p.id == payment.id).unwrap();
    assert_eq!(failed.status, PaymentStatus::Failed);
    assert_eq!(failed.retry_count, 3);

    // Terminal entries are never retried
    let calls_before = submitter.submitted().len();
    let report = queue.flush(&submitter).await;
    assert_eq!(report.sent + report.failed + report.expired, 0);
    assert_eq!(submitter.submitted().len(), calls_before);
}

#[tokio::test]
async fn test_one_bad_entry_does_not_block_the_rest() {
    let queue = OfflineQueue::new(3);
    queue
        .enqueue(&payload(), "bad-chain", Duration::seconds(3600))
        .await
        .unwrap();
    let good = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();

    let submitter = RecordingSubmitter::failing_for("bad-chain");
    let report = queue.flush(&submitter).await;

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);

    let history = queue.list_history().await.unwrap();
    let sent = history.iter().find(|p| p.id == good.id).unwrap();
    assert_eq!(sent.status, PaymentStatus::Sent);
}

#[tokio::test]
async fn test_concurrent_flushes_never_double_submit() {
    let queue = Arc::new(OfflineQueue::new(3));
    for _ in 0..5 {
        queue
            .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
            .await
            .unwrap();
    }

    let submitter = Arc::new(RecordingSubmitter::new().with_delay(20));

    let a = {
        let queue = Arc::clone(&queue);
        let submitter = Arc::clone(&submitter);
        tokio::spawn(async move { queue.flush(submitter.as_ref()).await })
    };
    let b = {
        let queue = Arc::clone(&queue);
        let submitter = Arc::clone(&submitter);
        tokio::spawn(async move { queue.flush(submitter.as_ref()).await })
    };

    let (report_a, report_b) = (a.await.unwrap(), b.await.unwrap());

    // Every entry submitted exactly once across both flushes
    let submitted = submitter.submitted();
    assert_eq!(submitted.len(), 5);
    assert_eq!(report_a.sent + report_b.sent, 5);

    assert!(queue.list_pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_queue_full_refuses_enqueue() {
    let queue = OfflineQueue::new(3).with_max_queue_size(2);

    queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();
    queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();

    let result = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await;
    assert!(matches!(result, Err(QueueError::QueueFull(2))));
}

#[tokio::test]
async fn test_expire_stale_without_submitting() {
    let queue = OfflineQueue::new(3);
    queue
        .enqueue(&payload(), "base-sepolia", Duration::milliseconds(-1))
        .await
        .unwrap();
    queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();

    let expired = queue.expire_stale(Utc::now()).await.unwrap();
    assert_eq!(expired, 1);
    assert_eq!(queue.list_pending().await.unwrap().len(), 1);
    assert_eq!(queue.list_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_persistent_queue_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("queue").to_str().unwrap().to_string();

    let first_id = {
        let queue = OfflineQueue::persistent(&path, 3).unwrap();
        let payment = queue
            .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
            .await
            .unwrap();
        queue
            .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
            .await
            .unwrap();
        payment.id
    };

    let queue = OfflineQueue::persistent(&path, 3).unwrap();
    let pending = queue.list_pending().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, first_id);

    // Sequence numbering continues, so ordering holds across restarts
    let third = queue
        .enqueue(&payload(), "base-sepolia", Duration::seconds(3600))
        .await
        .unwrap();
    assert!(third.sequence > pending[1].sequence);

    let submitter = RecordingSubmitter::new();
    let report = queue.flush(&submitter).await;
    assert_eq!(report.sent, 3);
    assert_eq!(submitter.submitted()[0], first_id);
}

pub mod error;
pub mod queue;
pub mod types;

pub use error::{QueueError, Result};
pub use queue::{ChainSubmitter, OfflineQueue};
pub use types::{FlushReport, PaymentStatus, QueuedPayment};

//! Error types for the offline payment queue

use thiserror::Error;

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Offline queue full ({0} pending entries)")]
    QueueFull(usize),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),
}

impl From<sled::Error> for QueueError {
    fn from(err: sled::Error) -> Self {
        QueueError::StorageError(err.to_string())
    }
}

impl From<bincode::Error> for QueueError {
    fn from(err: bincode::Error) -> Self {
        QueueError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        QueueError::SerializationError(err.to_string())
    }
}

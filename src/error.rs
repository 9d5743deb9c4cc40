//! Error types for pcbus
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in pcbus
#[derive(Debug, Error)]
pub enum PcbusError {
    /// Push attempted after the producer closed the queue
    #[error("Queue closed: push after close")]
    QueueClosed,

    /// The reading half of the queue is gone
    #[error("Queue disconnected: consumer dropped its end")]
    QueueDisconnected,

    /// Configuration rejected by validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A spawned pipeline task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for PcbusError {
    fn from(err: tokio::task::JoinError) -> Self {
        PcbusError::TaskFailed(err.to_string())
    }
}

/// Result type alias for pcbus operations
pub type Result<T> = std::result::Result<T, PcbusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_closed_error() {
        let err = PcbusError::QueueClosed;
        assert_eq!(err.to_string(), "Queue closed: push after close");
    }

    #[test]
    fn test_invalid_config_error() {
        let err = PcbusError::InvalidConfig("capacity must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid config: capacity must be positive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "script not found");
        let err: PcbusError = io_err.into();
        assert!(matches!(err, PcbusError::Io(_)));
        assert!(err.to_string().contains("script not found"));
    }

    #[tokio::test]
    async fn test_join_error_conversion() {
        let handle = tokio::spawn(async {
            std::future::pending::<()>().await;
        });
        handle.abort();
        let join_err = handle.await.unwrap_err();
        let err: PcbusError = join_err.into();
        assert!(matches!(err, PcbusError::TaskFailed(_)));
    }
}

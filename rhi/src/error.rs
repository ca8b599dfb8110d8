//! RHI error types.

use thiserror::Error;

use crate::types::{PixelFormat, QueueType};

/// Errors reported by constructing calls of the RHI.
///
/// Steady-state per-frame operations (submit, present, acquire, recording)
/// never return an error; their misuse is caught by debug assertions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RhiError {
    /// Failed to initialize a backend instance.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),
    /// The driver refused to create a logical device.
    #[error("device creation failed: {0}")]
    DeviceCreationFailed(String),
    /// More queues of a type were requested than the GPU exposes.
    #[error("requested {requested} {queue_type:?} queue(s), but only {available} available")]
    QueueUnavailable {
        queue_type: QueueType,
        requested: u8,
        available: u8,
    },
    /// Failed to create a resource.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// An invalid parameter was provided.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A view range exceeds its parent resource.
    #[error("view out of range: {0}")]
    ViewOutOfRange(String),
    /// A view is incompatible with its parent resource.
    #[error("incompatible view: {0}")]
    IncompatibleView(String),
    /// Bind group entries do not match their layout.
    #[error("binding mismatch: {0}")]
    BindingMismatch(String),
    /// The format is not supported for the requested use.
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(PixelFormat),
    /// Out of GPU memory.
    #[error("out of GPU memory")]
    OutOfMemory,
    /// The GPU device was lost.
    #[error("GPU device lost")]
    DeviceLost,
}

/// Result type used by constructing calls.
pub type RhiResult<T> = Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RhiError::OutOfMemory;
        assert_eq!(err.to_string(), "out of GPU memory");

        let err = RhiError::InitializationFailed("no GPU found".to_string());
        assert_eq!(err.to_string(), "initialization failed: no GPU found");
    }

    #[test]
    fn test_queue_unavailable_display() {
        let err = RhiError::QueueUnavailable {
            queue_type: QueueType::Compute,
            requested: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "requested 4 Compute queue(s), but only 1 available"
        );
    }
}

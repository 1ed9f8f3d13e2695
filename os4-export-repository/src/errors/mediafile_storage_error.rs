//! Mediafile storage error types.

use thiserror::Error;

/// Errors raised while reading mediafile payloads or their metadata.
///
/// A payload or metadata row that simply does not exist is not an error;
/// storages report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum MediafileStorageError {
    /// Reading from the underlying storage failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata file could not be decoded.
    #[error("Metadata decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The metadata decoded but does not have the expected shape.
    #[error("Invalid mediafile metadata: {0}")]
    InvalidMetadata(String),
}

impl MediafileStorageError {
    /// Create an invalid metadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }
}

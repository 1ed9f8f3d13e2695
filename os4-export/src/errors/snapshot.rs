use thiserror::Error;

/// Errors raised while loading an old snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot decoded but is not a mapping of collections to lists of
    /// objects with integer ids.
    #[error("Invalid snapshot: {0}")]
    InvalidShape(String),
}

impl SnapshotError {
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }
}

//! Types exchanged between mediafile storages and the exporter.

use serde::{Deserialize, Serialize};

/// The metadata row of an old mediafile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediafileMetadata {
    /// Name of the file as it was uploaded.
    pub original_filename: String,
}

/// A mediafile payload ready for the new data model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediafileBlob {
    pub filename: String,
    /// Size of the raw payload in bytes.
    pub filesize: usize,
    /// Base64 encoding of the raw payload.
    pub blob: String,
}

//! Mediafile storage trait definition.

use crate::errors::MediafileStorageError;
use crate::types::MediafileMetadata;

/// Abstracts where the payloads of old mediafiles are kept.
///
/// The old server either stored payloads in a side database table or in its
/// file storage, next to a metadata row holding the original filename. Each
/// lookup returns `Ok(None)` when the row or file does not exist.
pub trait MediafileStorage: Send + Sync {
    /// The metadata row for a mediafile.
    ///
    /// `None` means the mediafile was deleted after the snapshot was taken.
    fn metadata(&self, mediafile_id: i64) -> Result<Option<MediafileMetadata>, MediafileStorageError>;

    /// Whether payloads are kept in the side database table.
    fn uses_side_table(&self) -> bool;

    /// The payload stored in the side database table.
    fn side_table_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError>;

    /// The payload stored inline in the file storage.
    fn inline_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError>;
}

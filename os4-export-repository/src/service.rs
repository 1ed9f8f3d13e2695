//! Mediafile blob service.
//!
//! Resolves the payload of one old mediafile into a [`MediafileBlob`] using
//! the configured [`MediafileStorage`].

use base64::{engine::general_purpose, Engine as _};
use tracing::debug;

use crate::errors::MediafileStorageError;
use crate::interfaces::MediafileStorage;
use crate::memory::InMemoryMediafileStorage;
use crate::types::MediafileBlob;

/// High-level access to mediafile payloads.
///
/// Lookup order for a file:
/// 1. directories never have a payload;
/// 2. without a metadata row the mediafile is gone and there is no payload;
/// 3. the side database table, if the storage uses one;
/// 4. the inline file storage.
pub struct MediafileBlobService {
    storage: Box<dyn MediafileStorage>,
}

impl MediafileBlobService {
    /// Create a service on top of a storage implementation.
    pub fn new(storage: Box<dyn MediafileStorage>) -> Self {
        Self { storage }
    }

    /// A service without any payloads. Every file becomes a placeholder.
    pub fn empty() -> Self {
        Self::new(Box::new(InMemoryMediafileStorage::new()))
    }

    /// Read the payload of a mediafile.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(blob))` - payload found and base64 encoded
    /// * `Ok(None)` - directory, deleted metadata row or no stored payload
    /// * `Err(MediafileStorageError)` - the storage itself failed
    pub fn read_blob(
        &self,
        mediafile_id: i64,
        is_directory: bool,
    ) -> Result<Option<MediafileBlob>, MediafileStorageError> {
        if is_directory {
            return Ok(None);
        }

        let Some(metadata) = self.storage.metadata(mediafile_id)? else {
            debug!(mediafile_id, "No metadata row for mediafile");
            return Ok(None);
        };

        let mut data = None;
        if self.storage.uses_side_table() {
            data = self.storage.side_table_data(mediafile_id)?;
        }
        if data.is_none() {
            data = self.storage.inline_data(mediafile_id)?;
        }

        let Some(data) = data else {
            debug!(mediafile_id, "No payload stored for mediafile");
            return Ok(None);
        };

        Ok(Some(MediafileBlob {
            filename: metadata.original_filename,
            filesize: data.len(),
            blob: general_purpose::STANDARD.encode(&data),
        }))
    }
}

impl Default for MediafileBlobService {
    fn default() -> Self {
        Self::empty()
    }
}

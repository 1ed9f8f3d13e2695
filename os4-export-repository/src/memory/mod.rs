//! In-memory mediafile storage, used for fixtures and for exports without
//! payloads.

use std::collections::HashMap;

use crate::errors::MediafileStorageError;
use crate::interfaces::MediafileStorage;
use crate::types::MediafileMetadata;

/// A [`MediafileStorage`] backed by hash maps.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMediafileStorage {
    metadata: HashMap<i64, MediafileMetadata>,
    use_side_table: bool,
    side_table: HashMap<i64, Vec<u8>>,
    inline: HashMap<i64, Vec<u8>>,
}

impl InMemoryMediafileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the side table. While disabled, side table rows are ignored.
    pub fn with_side_table(mut self) -> Self {
        self.use_side_table = true;
        self
    }

    pub fn with_metadata(mut self, mediafile_id: i64, original_filename: impl Into<String>) -> Self {
        self.metadata.insert(
            mediafile_id,
            MediafileMetadata {
                original_filename: original_filename.into(),
            },
        );
        self
    }

    pub fn with_side_table_data(mut self, mediafile_id: i64, data: Vec<u8>) -> Self {
        self.side_table.insert(mediafile_id, data);
        self
    }

    pub fn with_inline_data(mut self, mediafile_id: i64, data: Vec<u8>) -> Self {
        self.inline.insert(mediafile_id, data);
        self
    }
}

impl MediafileStorage for InMemoryMediafileStorage {
    fn metadata(&self, mediafile_id: i64) -> Result<Option<MediafileMetadata>, MediafileStorageError> {
        Ok(self.metadata.get(&mediafile_id).cloned())
    }

    fn uses_side_table(&self) -> bool {
        self.use_side_table
    }

    fn side_table_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError> {
        Ok(self.side_table.get(&mediafile_id).cloned())
    }

    fn inline_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError> {
        Ok(self.inline.get(&mediafile_id).cloned())
    }
}

//! Filesystem mediafile storage.
//!
//! Reads a dump of the old mediafile storage laid out as:
//!
//! ```text
//! <root>/metadata.json      {"<id>": {"original_filename": "..."}, ...}
//! <root>/database/<id>      side table rows
//! <root>/files/<id>         inline payloads
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::MediafileStorageError;
use crate::interfaces::MediafileStorage;
use crate::types::MediafileMetadata;

const METADATA_FILE: &str = "metadata.json";
const SIDE_TABLE_DIR: &str = "database";
const INLINE_DIR: &str = "files";

/// A [`MediafileStorage`] reading payloads from a directory dump.
#[derive(Debug, Clone)]
pub struct FsMediafileStorage {
    root: PathBuf,
    use_side_table: bool,
    metadata: HashMap<i64, MediafileMetadata>,
}

impl FsMediafileStorage {
    /// Open a storage dump and load its metadata.
    ///
    /// A dump without `metadata.json` is valid and contains no files.
    pub fn open(root: impl Into<PathBuf>, use_side_table: bool) -> Result<Self, MediafileStorageError> {
        let root = root.into();
        let metadata = load_metadata(&root.join(METADATA_FILE))?;
        info!(
            root = %root.display(),
            use_side_table,
            file_count = metadata.len(),
            "Opened mediafile storage"
        );
        Ok(Self {
            root,
            use_side_table,
            metadata,
        })
    }

    fn read_optional(&self, dir: &str, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError> {
        let path = self.root.join(dir).join(mediafile_id.to_string());
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn load_metadata(path: &Path) -> Result<HashMap<i64, MediafileMetadata>, MediafileStorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(e.into()),
    };

    let entries: HashMap<String, MediafileMetadata> = serde_json::from_str(&raw)?;
    entries
        .into_iter()
        .map(|(key, metadata)| {
            key.parse::<i64>()
                .map(|id| (id, metadata))
                .map_err(|_| MediafileStorageError::invalid_metadata(format!("non-numeric id '{}'", key)))
        })
        .collect()
}

impl MediafileStorage for FsMediafileStorage {
    fn metadata(&self, mediafile_id: i64) -> Result<Option<MediafileMetadata>, MediafileStorageError> {
        Ok(self.metadata.get(&mediafile_id).cloned())
    }

    fn uses_side_table(&self) -> bool {
        self.use_side_table
    }

    fn side_table_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError> {
        self.read_optional(SIDE_TABLE_DIR, mediafile_id)
    }

    fn inline_data(&self, mediafile_id: i64) -> Result<Option<Vec<u8>>, MediafileStorageError> {
        self.read_optional(INLINE_DIR, mediafile_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dump() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(METADATA_FILE),
            r#"{"1": {"original_filename": "agenda.pdf"}, "2": {"original_filename": "logo.png"}}"#,
        )
        .unwrap();
        fs::create_dir(dir.path().join(SIDE_TABLE_DIR)).unwrap();
        fs::create_dir(dir.path().join(INLINE_DIR)).unwrap();
        fs::write(dir.path().join(SIDE_TABLE_DIR).join("1"), b"db-bytes").unwrap();
        fs::write(dir.path().join(INLINE_DIR).join("2"), b"png").unwrap();
        dir
    }

    #[test]
    fn test_reads_metadata_and_payloads() {
        let dir = dump();
        let storage = FsMediafileStorage::open(dir.path(), true).unwrap();

        assert_eq!(
            storage.metadata(1).unwrap().unwrap().original_filename,
            "agenda.pdf"
        );
        assert!(storage.uses_side_table());
        assert_eq!(storage.side_table_data(1).unwrap(), Some(b"db-bytes".to_vec()));
        assert_eq!(storage.inline_data(2).unwrap(), Some(b"png".to_vec()));
    }

    #[test]
    fn test_missing_files_read_as_none() {
        let dir = dump();
        let storage = FsMediafileStorage::open(dir.path(), false).unwrap();

        assert_eq!(storage.metadata(9).unwrap(), None);
        assert_eq!(storage.side_table_data(2).unwrap(), None);
        assert_eq!(storage.inline_data(1).unwrap(), None);
    }

    #[test]
    fn test_empty_dump_has_no_files() {
        let dir = TempDir::new().unwrap();
        let storage = FsMediafileStorage::open(dir.path(), false).unwrap();
        assert_eq!(storage.metadata(1).unwrap(), None);
    }

    #[test]
    fn test_rejects_non_numeric_ids() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(METADATA_FILE),
            r#"{"one": {"original_filename": "x"}}"#,
        )
        .unwrap();
        let result = FsMediafileStorage::open(dir.path(), false);
        assert!(matches!(result, Err(MediafileStorageError::InvalidMetadata(_))));
    }
}

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::info;

use super::Snapshot;
use crate::errors::SnapshotError;

impl Snapshot {
    /// Load a snapshot from a JSON file of the form
    /// `{"<collection>": [{...}, ...], ...}`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let snapshot = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            objects = snapshot.len(),
            "Loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SnapshotError> {
        let Value::Object(raw) = value else {
            return Err(SnapshotError::invalid_shape("top level is not an object"));
        };

        let mut collections = BTreeMap::new();
        for (collection, models) in raw {
            let Value::Array(models) = models else {
                return Err(SnapshotError::invalid_shape(format!(
                    "collection {} is not a list",
                    collection
                )));
            };
            let models = models
                .into_iter()
                .map(|model| match model {
                    Value::Object(model) => Ok(model),
                    _ => Err(SnapshotError::invalid_shape(format!(
                        "collection {} contains a non-object",
                        collection
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            collections.insert(collection, models);
        }

        Self::new(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"core/tag": [{{"id": 1, "name": "t"}}]}}"#).unwrap();

        let snapshot = Snapshot::from_path(file.path()).unwrap();
        assert_eq!(snapshot.collection("core/tag").len(), 1);
    }

    #[test]
    fn test_rejects_non_list_collection() {
        let result = Snapshot::from_value(json!({"core/tag": {"id": 1}}));
        assert!(matches!(result, Err(SnapshotError::InvalidShape(_))));
    }

    #[test]
    fn test_rejects_non_object_top_level() {
        let result = Snapshot::from_value(json!([1, 2]));
        assert!(matches!(result, Err(SnapshotError::InvalidShape(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = Snapshot::from_reader("{".as_bytes());
        assert!(matches!(result, Err(SnapshotError::Json(_))));
    }
}

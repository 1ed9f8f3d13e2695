use os4_export_repository::MediafileStorageError;
use thiserror::Error;

/// Errors that abort an export run.
///
/// Tolerated data drift (unknown state restrictions, unparsable timestamps,
/// votes outside the poll method, dangling config references) never surfaces
/// here; it is logged and migrated into a degraded but valid record.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The same `(collection, id)` pair was registered twice.
    #[error("Tried to overwrite {collection}/{id}")]
    DuplicateModel { collection: String, id: i64 },

    /// An old collection name without a counterpart in the new data model.
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// A projector element whose slide cannot be carried forward.
    #[error("Unknown slide {0}")]
    UnknownSlide(String),

    /// A model referenced by another model does not exist.
    #[error("Missing model {collection}/{id}")]
    MissingModel { collection: String, id: i64 },

    /// A field required by the migration is missing or has the wrong type.
    #[error("Missing field '{field}' on {model}")]
    MissingField { model: String, field: String },

    /// A field holds a value outside of its known domain.
    #[error("Invalid value for '{field}' on {model}: {value}")]
    InvalidValue {
        model: String,
        field: String,
        value: String,
    },

    /// Reading a mediafile payload failed.
    #[error("Mediafile storage error: {0}")]
    Storage(#[from] MediafileStorageError),
}

impl MigrationError {
    pub fn duplicate(collection: impl Into<String>, id: i64) -> Self {
        Self::DuplicateModel {
            collection: collection.into(),
            id,
        }
    }

    pub fn missing_model(collection: impl Into<String>, id: i64) -> Self {
        Self::MissingModel {
            collection: collection.into(),
            id,
        }
    }

    pub fn missing_field(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            model: model.into(),
            field: field.into(),
        }
    }

    pub fn invalid_value(
        model: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidValue {
            model: model.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }
}

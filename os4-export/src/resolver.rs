//! Fully-qualified id resolution for references into the old data model.

use os4_export_shared::{Fqid, ModelExt, OldCollection};
use serde_json::Value;

use crate::errors::MigrationError;
use crate::remap::IdOffsets;

/// Turns old `(collection, id)` references into new fqids.
///
/// Resolution is pure: resolving the same reference twice yields the same
/// fqid.
#[derive(Debug, Clone, Copy, Default)]
pub struct FqidResolver {
    offsets: IdOffsets,
}

impl FqidResolver {
    pub fn new(offsets: IdOffsets) -> Self {
        Self { offsets }
    }

    pub fn offsets(&self) -> IdOffsets {
        self.offsets
    }

    /// Resolve an old collection name and id.
    ///
    /// Fails with [`MigrationError::UnknownCollection`] when the collection
    /// has no counterpart in the new data model.
    pub fn resolve(&self, collection: &str, id: i64) -> Result<Fqid, MigrationError> {
        let collection: OldCollection = collection
            .parse()
            .map_err(MigrationError::UnknownCollection)?;
        Ok(self.resolve_known(collection, id))
    }

    pub fn resolve_known(&self, collection: OldCollection, id: i64) -> Fqid {
        Fqid::new(
            collection.new_collection(),
            self.offsets.new_id(collection, id),
        )
    }

    /// Resolve a generic reference of the form `{"collection": .., "id": ..}`.
    pub fn resolve_reference(&self, reference: &Value) -> Result<Fqid, MigrationError> {
        let Value::Object(reference) = reference else {
            return Err(MigrationError::invalid_value(
                "generic reference",
                "content_object",
                reference,
            ));
        };
        let collection = reference
            .text("collection")
            .ok_or_else(|| MigrationError::missing_field("generic reference", "collection"))?;
        let id = reference
            .int("id")
            .ok_or_else(|| MigrationError::missing_field("generic reference", "id"))?;
        self.resolve(collection, id)
    }
}

//! The old data model, held in memory for one export run.
//!
//! A snapshot maps old collection names (`"motions/motion"`) to their objects
//! in the order they were read. An index per collection gives random access
//! by id.

mod loader;

use std::collections::{BTreeMap, HashMap};

use os4_export_shared::{Model, ModelExt};

use crate::errors::SnapshotError;

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    collections: BTreeMap<String, Vec<Model>>,
    index: HashMap<String, HashMap<i64, usize>>,
}

impl Snapshot {
    /// Build a snapshot, checking that every object has an integer id.
    pub fn new(collections: BTreeMap<String, Vec<Model>>) -> Result<Self, SnapshotError> {
        for (collection, models) in &collections {
            if let Some(position) = models.iter().position(|model| model.id().is_none()) {
                return Err(SnapshotError::invalid_shape(format!(
                    "object {} of {} has no integer id",
                    position, collection
                )));
            }
        }

        let mut snapshot = Self {
            collections,
            index: HashMap::new(),
        };
        snapshot.reindex();
        Ok(snapshot)
    }

    /// The objects of a collection. Unknown collections are empty.
    pub fn collection(&self, name: &str) -> &[Model] {
        self.collections
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up one object by its id.
    pub fn get(&self, collection: &str, id: i64) -> Option<&Model> {
        let position = *self.index.get(collection)?.get(&id)?;
        self.collections.get(collection)?.get(position)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Total number of objects across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutable access for the id remapper. Callers that change ids must
    /// call [`Snapshot::reindex`] afterwards.
    pub(crate) fn collection_mut(&mut self, name: &str) -> Option<&mut Vec<Model>> {
        self.collections.get_mut(name)
    }

    pub(crate) fn reindex(&mut self) {
        self.index = self
            .collections
            .iter()
            .map(|(name, models)| {
                let by_id = models
                    .iter()
                    .enumerate()
                    .filter_map(|(position, model)| model.id().map(|id| (id, position)))
                    .collect();
                (name.clone(), by_id)
            })
            .collect();
    }
}

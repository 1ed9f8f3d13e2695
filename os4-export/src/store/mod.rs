//! The output store.
//!
//! Holds the new data model while the migration runs. Every object is
//! registered exactly once; later stages only mutate registered objects.
//! Objects keep their insertion order per collection so reverse relations and
//! the emitted JSON are deterministic.

mod format;

use std::collections::{BTreeMap, HashMap};

use os4_export_shared::{Model, ModelExt};

use crate::errors::MigrationError;

pub use format::OutputFormat;

#[derive(Debug, Clone, Default)]
struct Collection {
    models: Vec<Model>,
    positions: HashMap<i64, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputStore {
    collections: BTreeMap<String, Collection>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new object.
    ///
    /// Registering the same `(collection, id)` pair twice is a bug in a
    /// migrator and fails with [`MigrationError::DuplicateModel`].
    pub fn set_model(&mut self, collection: &str, model: Model) -> Result<(), MigrationError> {
        let id = model
            .id()
            .ok_or_else(|| MigrationError::missing_field(collection, "id"))?;
        let entry = self.collections.entry(collection.to_string()).or_default();
        if entry.positions.contains_key(&id) {
            return Err(MigrationError::duplicate(collection, id));
        }
        entry.positions.insert(id, entry.models.len());
        entry.models.push(model);
        Ok(())
    }

    pub fn get(&self, collection: &str, id: i64) -> Option<&Model> {
        let entry = self.collections.get(collection)?;
        entry.models.get(*entry.positions.get(&id)?)
    }

    pub fn get_mut(&mut self, collection: &str, id: i64) -> Option<&mut Model> {
        let entry = self.collections.get_mut(collection)?;
        let position = *entry.positions.get(&id)?;
        entry.models.get_mut(position)
    }

    /// Like [`OutputStore::get`], failing with
    /// [`MigrationError::MissingModel`] for unknown objects.
    pub fn model(&self, collection: &str, id: i64) -> Result<&Model, MigrationError> {
        self.get(collection, id)
            .ok_or_else(|| MigrationError::missing_model(collection, id))
    }

    pub fn model_mut(&mut self, collection: &str, id: i64) -> Result<&mut Model, MigrationError> {
        self.get_mut(collection, id)
            .ok_or_else(|| MigrationError::missing_model(collection, id))
    }

    pub fn exists(&self, collection: &str, id: i64) -> bool {
        self.get(collection, id).is_some()
    }

    /// The objects of a collection in insertion order.
    pub fn iter(&self, collection: &str) -> impl Iterator<Item = &Model> {
        self.collections
            .get(collection)
            .into_iter()
            .flat_map(|entry| entry.models.iter())
    }

    pub fn iter_mut(&mut self, collection: &str) -> impl Iterator<Item = &mut Model> {
        self.collections
            .get_mut(collection)
            .into_iter()
            .flat_map(|entry| entry.models.iter_mut())
    }

    /// The ids of a collection in insertion order.
    pub fn ids(&self, collection: &str) -> Vec<i64> {
        self.iter(collection).filter_map(|model| model.id()).collect()
    }

    /// Number of objects in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map_or(0, |entry| entry.models.len())
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Total number of objects across all collections.
    pub fn len(&self) -> usize {
        self.collections.values().map(|entry| entry.models.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

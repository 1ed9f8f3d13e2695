//! Interface definitions for mediafile storages.
//!
//! The exporter only depends on the `MediafileStorage` trait so the payload
//! source can be swapped (filesystem dump, in-memory fixture, ...).

mod mediafile_storage;

pub use mediafile_storage::MediafileStorage;

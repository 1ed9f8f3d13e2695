//! # OS4 Export Repository
//!
//! This crate provides the storage side of mediafile export. Binary payloads
//! of old mediafiles live outside the snapshot, either in a side database
//! table or inline in the file storage of the old server. The
//! `MediafileStorage` trait abstracts both places, and `MediafileBlobService`
//! implements the lookup order used by the exporter.

pub mod errors;
pub mod filesystem;
pub mod interfaces;
pub mod memory;
pub mod service;
pub mod types;

pub use errors::MediafileStorageError;
pub use filesystem::FsMediafileStorage;
pub use interfaces::MediafileStorage;
pub use memory::InMemoryMediafileStorage;
pub use service::MediafileBlobService;
pub use types::{MediafileBlob, MediafileMetadata};

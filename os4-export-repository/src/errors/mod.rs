//! Error types for the mediafile storage.

mod mediafile_storage_error;

pub use mediafile_storage_error::MediafileStorageError;

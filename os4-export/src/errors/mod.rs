//! Error types for the exporter engine.

mod migration;
mod snapshot;

pub use migration::MigrationError;
pub use snapshot::SnapshotError;

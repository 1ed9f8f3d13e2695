//! # OS4 Export
//!
//! Migrates an OpenSlides 3 snapshot into the flat object graph of the
//! OpenSlides 4 data model.
//!
//! The export is one synchronous pass:
//!
//! 1. motion poll, option and vote ids are shifted past the assignment ids
//!    ([`remap`]),
//! 2. one stage per old domain writes the new objects into an
//!    [`store::OutputStore`] ([`migration`]),
//! 3. reverse relations are recomputed from the forward keys,
//! 4. the old global config is folded into the singleton meeting.
//!
//! Payloads of mediafiles are read through the
//! [`os4_export_repository::MediafileBlobService`].

pub mod config;
pub mod errors;
pub mod migration;
pub mod permissions;
pub mod relations;
pub mod remap;
pub mod resolver;
pub mod slides;
pub mod snapshot;
pub mod store;
pub mod time;

use std::io::Write;

use os4_export_repository::MediafileBlobService;
use thiserror::Error;

pub use config::{ExportSettings, RunConfig};
pub use errors::{MigrationError, SnapshotError};
pub use migration::{Exporter, Migrate, MigrationContext, MigrationPipeline};
pub use snapshot::Snapshot;
pub use store::{OutputFormat, OutputStore};

/// Top level error of an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("Output error: {0}")]
    Output(String),
}

impl ExportError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}

/// Run the standard export over a loaded snapshot.
pub fn export(
    snapshot: Snapshot,
    settings: &ExportSettings,
    blobs: &MediafileBlobService,
) -> Result<OutputStore, ExportError> {
    Ok(Exporter::new(settings, blobs).export(snapshot)?)
}

/// Serialize the output store in the given format.
pub fn write_output(
    store: &OutputStore,
    format: OutputFormat,
    mut writer: impl Write,
    pretty: bool,
) -> Result<(), ExportError> {
    let data = store.render(format);
    let written = if pretty {
        serde_json::to_writer_pretty(&mut writer, &data)
    } else {
        serde_json::to_writer(&mut writer, &data)
    };
    written.map_err(|e| ExportError::output(e.to_string()))?;
    writeln!(writer).map_err(|e| ExportError::output(e.to_string()))?;
    writer.flush().map_err(|e| ExportError::output(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_write_output_formats() {
        let snapshot = Snapshot::from_value(json!({"topics/topic": [{"id": 2, "title": "x"}]}))
            .unwrap();
        let store = export(
            snapshot,
            &ExportSettings::default(),
            &MediafileBlobService::empty(),
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_output(&store, OutputFormat::Index, &mut buffer, false).unwrap();
        let index: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(index["topic"]["2"]["title"], json!("x"));

        let mut buffer = Vec::new();
        write_output(&store, OutputFormat::List, &mut buffer, true).unwrap();
        let list: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(list["topic"][0]["id"], json!(2));
        assert_eq!(list["meeting"][0]["id"], json!(1));
    }

    #[test]
    fn test_errors_convert() {
        let error: ExportError = MigrationError::UnknownSlide("core/weather".into()).into();
        assert!(matches!(error, ExportError::Migration(_)));
        assert_eq!(error.to_string(), "Unknown slide core/weather");
    }
}

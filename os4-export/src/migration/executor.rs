// Export executor - orchestrates one export run
use std::time::Instant;

use os4_export_repository::MediafileBlobService;
use tracing::info;

use super::{MigrationContext, MigrationPipeline};
use crate::config::ExportSettings;
use crate::errors::MigrationError;
use crate::remap::remap_motion_poll_ids;
use crate::resolver::FqidResolver;
use crate::snapshot::Snapshot;
use crate::store::OutputStore;

/// Runs a pipeline against one snapshot.
pub struct Exporter<'a> {
    settings: &'a ExportSettings,
    blobs: &'a MediafileBlobService,
    pipeline: MigrationPipeline,
}

impl<'a> Exporter<'a> {
    /// Create an exporter running the standard pipeline
    pub fn new(settings: &'a ExportSettings, blobs: &'a MediafileBlobService) -> Self {
        Self::with_pipeline(settings, blobs, MigrationPipeline::standard())
    }

    pub fn with_pipeline(
        settings: &'a ExportSettings,
        blobs: &'a MediafileBlobService,
        pipeline: MigrationPipeline,
    ) -> Self {
        Self {
            settings,
            blobs,
            pipeline,
        }
    }

    /// Execute the full export.
    ///
    /// The snapshot is consumed: motion poll ids are remapped in place
    /// before any stage reads it.
    pub fn export(&self, mut snapshot: Snapshot) -> Result<OutputStore, MigrationError> {
        let start_time = Instant::now();
        info!(collections = snapshot.len(), "Starting export");

        let offsets = remap_motion_poll_ids(&mut snapshot);
        let mut ctx = MigrationContext::new(
            &snapshot,
            FqidResolver::new(offsets),
            self.settings,
            self.blobs,
        )?;
        self.pipeline.run(&mut ctx)?;

        let store = ctx.store;
        info!(
            objects = store.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "✓ Export complete"
        );
        Ok(store)
    }
}

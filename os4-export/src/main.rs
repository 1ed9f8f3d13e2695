use std::env;
use std::fs::File;
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use os4_export::{export, write_output, ExportSettings, RunConfig, Snapshot};
use os4_export_repository::{FsMediafileStorage, MediafileBlobService};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT: &str = "OS4_EXPORT_LOG_FORMAT";

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let run = RunConfig::from_env().context("Failed to read the run configuration")?;
    let settings = ExportSettings::from_env().context("Failed to read the export settings")?;

    let blobs = match &run.mediafile_dir {
        Some(root) => {
            let storage = FsMediafileStorage::open(root, run.mediafile_database)
                .with_context(|| format!("Failed to open mediafile storage at {}", root.display()))?;
            MediafileBlobService::new(Box::new(storage))
        }
        None => {
            info!("No mediafile storage configured, exporting mediafiles as placeholders");
            MediafileBlobService::empty()
        }
    };

    info!(input = %run.input.display(), "Loading snapshot...");
    let snapshot = Snapshot::from_path(&run.input)
        .with_context(|| format!("Failed to load snapshot {}", run.input.display()))?;
    info!(objects = snapshot.len(), "✓ Loaded snapshot");

    let store = export(snapshot, &settings, &blobs).context("Export failed")?;

    match &run.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_output(&store, run.format, BufWriter::new(file), run.pretty)?;
            info!(output = %path.display(), format = %run.format, "✓ Wrote export");
        }
        None => {
            let stdout = io::stdout();
            write_output(&store, run.format, BufWriter::new(stdout.lock()), run.pretty)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "os4_export=info".into()),
    );

    // Logs go to stderr so the export can be piped from stdout.
    let json = env::var(LOG_FORMAT).is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(io::stderr)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .init();
    }
}

//! Configuration for an export run.
//!
//! - [`settings`]: values read from the environment
//! - [`defaults`]: fallback values for absent meeting config keys

pub mod defaults;
pub mod settings;

pub use settings::{ExportSettings, RunConfig};

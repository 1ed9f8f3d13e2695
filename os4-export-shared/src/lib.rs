//! # OS4 Export Shared
//!
//! This crate defines the value types shared between the exporter engine and
//! its storage adapters: the table of old collections, fully-qualified ids,
//! template fields and the dynamic `Model` representation used for both the
//! old snapshot and the new output store.

pub mod types;

pub use types::collection::{OldCollection, PollFamily};
pub use types::fqid::{Fqid, FqidParseError};
pub use types::model::{is_blank, Model, ModelExt};
pub use types::template_field::{TemplateField, MEETING_REPLACEMENT};

/// Every export covers exactly one meeting, which always gets this id.
pub const MEETING_ID: i64 = 1;

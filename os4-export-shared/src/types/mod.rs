//! Core data types used across the exporter.
//! Re-exports the collection table, fqids, models and template fields.

pub mod collection;
pub mod fqid;
pub mod model;
pub mod template_field;

pub use collection::{OldCollection, PollFamily};
pub use fqid::Fqid;
pub use model::{Model, ModelExt};
pub use template_field::TemplateField;

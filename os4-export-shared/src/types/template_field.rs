//! Template fields.
//!
//! Cross-meeting objects (users, and a few meeting-scoped markers on
//! mediafiles and projectors) store per-scope data with a naming convention:
//! a marker field such as `speaker_$_ids` lists the active replacements
//! (`["1"]`), and each replacement has its own concrete field
//! (`speaker_$1_ids`) holding the value.

use serde_json::Value;

use super::model::{is_blank, Model, ModelExt};

/// The replacement used for data scoped to the exported meeting.
pub const MEETING_REPLACEMENT: &str = "1";

/// A template field name split around its `$` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateField {
    prefix: &'static str,
    suffix: &'static str,
}

impl TemplateField {
    /// Build from a template name such as `"speaker_$_ids"`.
    ///
    /// A name without `$` is treated as having the placeholder at its end.
    pub fn new(name: &'static str) -> Self {
        match name.split_once('$') {
            Some((prefix, suffix)) => Self { prefix, suffix },
            None => Self {
                prefix: name,
                suffix: "",
            },
        }
    }

    /// The marker field name, e.g. `speaker_$_ids`.
    pub fn name(&self) -> String {
        format!("{}${}", self.prefix, self.suffix)
    }

    /// The concrete field name for one replacement, e.g. `speaker_$1_ids`.
    pub fn concrete(&self, replacement: &str) -> String {
        format!("{}${}{}", self.prefix, replacement, self.suffix)
    }

    /// Emit an empty marker list, leaving no concrete field behind.
    pub fn init(&self, model: &mut Model) {
        model.insert(self.name(), Value::Array(Vec::new()));
    }

    /// Set the value for a single replacement.
    ///
    /// A blank value (`null`, `[]`, ...) produces an empty marker list and no
    /// concrete field; anything else produces `[replacement]` plus the
    /// concrete field.
    pub fn set(&self, model: &mut Model, replacement: &str, value: impl Into<Value>) {
        let value = value.into();
        let concrete = self.concrete(replacement);
        if is_blank(&value) {
            model.remove(&concrete);
            self.init(model);
        } else {
            model.insert(
                self.name(),
                Value::Array(vec![Value::String(replacement.to_string())]),
            );
            model.insert(concrete, value);
        }
    }

    /// [`TemplateField::set`] for the exported meeting.
    pub fn set_for_meeting(&self, model: &mut Model, value: impl Into<Value>) {
        self.set(model, MEETING_REPLACEMENT, value);
    }

    /// Register an additional replacement and store its value, keeping the
    /// replacements that are already listed.
    pub fn add(&self, model: &mut Model, replacement: &str, value: impl Into<Value>) {
        self.register(model, replacement);
        model.insert(self.concrete(replacement), value.into());
    }

    /// Append one item to the concrete list of a replacement, registering the
    /// replacement first if needed.
    pub fn push(&self, model: &mut Model, replacement: &str, item: impl Into<Value>) {
        self.register(model, replacement);
        model.push_to(&self.concrete(replacement), item.into());
    }

    /// The replacements currently listed in the marker field.
    pub fn replacements(&self, model: &Model) -> Vec<String> {
        match model.get(&self.name()) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn register(&self, model: &mut Model, replacement: &str) {
        let replacement = Value::String(replacement.to_string());
        let listed = match model.get(&self.name()) {
            Some(Value::Array(items)) => items.contains(&replacement),
            _ => false,
        };
        if !listed {
            model.push_to(&self.name(), replacement);
        }
    }
}

//! The migration pipeline.
//!
//! Each old domain is migrated by one stage implementing [`Migrate`]. Stages
//! are registered in a [`MigrationPipeline`] in dependency order: later
//! stages read objects that earlier ones registered in the output store.
//!
//! ## Stages
//!
//! 1. agenda items, topics, lists of speakers
//! 2. the voting system (votes, options, polls, global options)
//! 3. tags, chat groups, assignments, mediafiles, motions
//! 4. motion substructures, states and workflows
//! 5. projector messages and countdowns
//! 6. personal notes, users, groups
//! 7. projectors and projections
//! 8. reverse relations
//! 9. the meeting

mod agenda;
mod assignments;
mod chat;
mod executor;
mod groups;
mod meeting;
mod mediafiles;
mod motion_parts;
mod motion_states;
mod motions;
mod personal_notes;
mod projector_artifacts;
mod projectors;
mod reverse;
mod speakers;
mod tags;
mod topics;
mod users;
mod voting;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use os4_export_repository::MediafileBlobService;
use os4_export_shared::{Model, ModelExt, OldCollection, MEETING_ID};
use serde_json::{json, Value};
use tracing::info;

use crate::config::ExportSettings;
use crate::errors::MigrationError;
use crate::resolver::FqidResolver;
use crate::snapshot::Snapshot;
use crate::store::OutputStore;

pub use executor::Exporter;
pub use meeting::consumed_config_keys;

/// Counters for synthesized objects, shared by all stages of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counters {
    /// Next id for a global option.
    pub option: i64,
    /// Next projection id.
    pub projection: i64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            option: 1,
            projection: 1,
        }
    }
}

/// Everything a stage reads and writes during one export run.
pub struct MigrationContext<'a> {
    pub snapshot: &'a Snapshot,
    pub store: OutputStore,
    pub resolver: FqidResolver,
    pub settings: &'a ExportSettings,
    pub blobs: &'a MediafileBlobService,
    pub counters: Counters,
}

impl<'a> MigrationContext<'a> {
    /// Create a context with an output store holding only the meeting.
    pub fn new(
        snapshot: &'a Snapshot,
        resolver: FqidResolver,
        settings: &'a ExportSettings,
        blobs: &'a MediafileBlobService,
    ) -> Result<Self, MigrationError> {
        let mut store = OutputStore::new();
        store.set_model("meeting", object(json!({"id": MEETING_ID, "projection_ids": []})))?;
        Ok(Self {
            snapshot,
            store,
            resolver,
            settings,
            blobs,
            counters: Counters::default(),
        })
    }

    pub fn meeting_mut(&mut self) -> Result<&mut Model, MigrationError> {
        self.store.model_mut("meeting", MEETING_ID)
    }
}

/// One migration stage.
pub trait Migrate: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError>;
}

/// An ordered registry of stages.
#[derive(Default, Clone)]
pub struct MigrationPipeline {
    stages: Vec<Arc<dyn Migrate>>,
}

impl MigrationPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The full export in dependency order.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Arc::new(agenda::AgendaItems));
        pipeline.register(Arc::new(topics::Topics));
        pipeline.register(Arc::new(speakers::ListsOfSpeakers));
        pipeline.register(Arc::new(voting::VotingSystem));
        pipeline.register(Arc::new(tags::Tags));
        pipeline.register(Arc::new(chat::ChatGroups));
        pipeline.register(Arc::new(assignments::Assignments));
        pipeline.register(Arc::new(mediafiles::Mediafiles));
        pipeline.register(Arc::new(motions::Motions));
        pipeline.register(Arc::new(motion_parts::MotionCommentSections));
        pipeline.register(Arc::new(motion_parts::MotionBlocks));
        pipeline.register(Arc::new(motion_parts::MotionCategories));
        pipeline.register(Arc::new(motion_parts::MotionChangeRecommendations));
        pipeline.register(Arc::new(motion_parts::MotionStatuteParagraphs));
        pipeline.register(Arc::new(motion_states::MotionStates));
        pipeline.register(Arc::new(motion_states::MotionWorkflows));
        pipeline.register(Arc::new(projector_artifacts::ProjectorMessages));
        pipeline.register(Arc::new(projector_artifacts::ProjectorCountdowns));
        pipeline.register(Arc::new(personal_notes::PersonalNotes));
        pipeline.register(Arc::new(users::Users));
        pipeline.register(Arc::new(groups::Groups));
        pipeline.register(Arc::new(projectors::Projectors));
        pipeline.register(Arc::new(reverse::ReverseRelations));
        pipeline.register(Arc::new(meeting::Meeting));
        pipeline
    }

    /// Append a stage. Stages run in registration order.
    pub fn register(&mut self, stage: Arc<dyn Migrate>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage, stopping at the first error.
    pub fn run(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for stage in &self.stages {
            let started = Instant::now();
            let before = ctx.store.len();
            stage.migrate(ctx)?;
            info!(
                stage = stage.name(),
                created = ctx.store.len() - before,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "✓ Migrated"
            );
        }
        Ok(())
    }
}

// Helpers shared by the stages.

/// Unwrap a `json!` object literal.
pub(crate) fn object(value: Value) -> Model {
    match value {
        Value::Object(model) => model,
        _ => Model::new(),
    }
}

/// `"<collection>/<id>"` of an old object, for error messages and logs.
pub(crate) fn label(collection: &str, model: &Model) -> String {
    match model.id() {
        Some(id) => format!("{}/{}", collection, id),
        None => collection.to_string(),
    }
}

pub(crate) fn required_id(collection: &str, model: &Model) -> Result<i64, MigrationError> {
    model
        .id()
        .ok_or_else(|| MigrationError::missing_field(collection, "id"))
}

pub(crate) fn required_int(
    collection: &str,
    model: &Model,
    field: &str,
) -> Result<i64, MigrationError> {
    model
        .int(field)
        .ok_or_else(|| MigrationError::missing_field(label(collection, model), field))
}

pub(crate) fn required<'m>(
    collection: &str,
    model: &'m Model,
    field: &str,
) -> Result<&'m Value, MigrationError> {
    model
        .get(field)
        .ok_or_else(|| MigrationError::missing_field(label(collection, model), field))
}

/// Map an integer enum field through a fixed table.
pub(crate) fn map_enum(
    collection: &str,
    model: &Model,
    field: &str,
    table: &[(i64, &'static str)],
) -> Result<&'static str, MigrationError> {
    let raw = required_int(collection, model, field)?;
    table
        .iter()
        .find(|(key, _)| *key == raw)
        .map(|(_, name)| *name)
        .ok_or_else(|| MigrationError::invalid_value(label(collection, model), field, raw))
}

/// The value of a field, `null` when absent.
pub(crate) fn field(model: &Model, name: &str) -> Value {
    model.get(name).cloned().unwrap_or(Value::Null)
}

/// An id list field as a JSON list, empty when absent.
pub(crate) fn id_list(model: &Model, name: &str) -> Value {
    json!(model.ids(name))
}

/// Generic reverse relation: for every id listed in `field` of the given old
/// collections, the fqids of the objects listing it. Collections are scanned
/// in the order given and each object contributes at most once per id.
pub(crate) fn reverse_fqids(
    ctx: &MigrationContext<'_>,
    field: &str,
    collections: &[OldCollection],
) -> HashMap<i64, Vec<Value>> {
    let mut groups: HashMap<i64, Vec<Value>> = HashMap::new();
    for &collection in collections {
        for model in ctx.snapshot.collection(collection.as_str()) {
            let Some(id) = model.id() else {
                continue;
            };
            let fqid: Value = ctx.resolver.resolve_known(collection, id).into();
            for member in model.ids(field) {
                let group = groups.entry(member).or_default();
                if group.last() != Some(&fqid) {
                    group.push(fqid.clone());
                }
            }
        }
    }
    groups
}

/// Stamp the meeting id onto a new object.
pub(crate) fn in_meeting(model: &mut Model) {
    model.insert("meeting_id".to_string(), json!(MEETING_ID));
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn snapshot(value: Value) -> Snapshot {
        Snapshot::from_value(value).unwrap()
    }

    /// Run the given stages against a snapshot, remapping ids first.
    pub fn run(
        value: Value,
        stages: Vec<Arc<dyn Migrate>>,
    ) -> Result<OutputStore, MigrationError> {
        run_with(
            value,
            stages,
            &ExportSettings::default(),
            &MediafileBlobService::empty(),
        )
    }

    pub fn run_with(
        value: Value,
        stages: Vec<Arc<dyn Migrate>>,
        settings: &ExportSettings,
        blobs: &MediafileBlobService,
    ) -> Result<OutputStore, MigrationError> {
        let mut snapshot = snapshot(value);
        let offsets = crate::remap::remap_motion_poll_ids(&mut snapshot);
        let mut ctx = MigrationContext::new(
            &snapshot,
            FqidResolver::new(offsets),
            settings,
            blobs,
        )?;
        let mut pipeline = MigrationPipeline::new();
        for stage in stages {
            pipeline.register(stage);
        }
        pipeline.run(&mut ctx)?;
        Ok(ctx.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Migrate for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn migrate(&self, _ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    struct Failing;

    impl Migrate for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn migrate(&self, _ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
            Err(MigrationError::UnknownSlide("x".into()))
        }
    }

    #[test]
    fn test_stages_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stages: Vec<Arc<dyn Migrate>> = vec![
            Arc::new(Recorder { name: "b", log: log.clone() }),
            Arc::new(Recorder { name: "a", log: log.clone() }),
        ];
        test_support::run(json!({}), stages).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_first_error_stops_the_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stages: Vec<Arc<dyn Migrate>> = vec![
            Arc::new(Failing),
            Arc::new(Recorder { name: "after", log: log.clone() }),
        ];
        let result = test_support::run(json!({}), stages);
        assert!(matches!(result, Err(MigrationError::UnknownSlide(_))));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_standard_pipeline_order() {
        let names = MigrationPipeline::standard().stage_names();
        assert_eq!(names.first(), Some(&"agenda_items"));
        assert_eq!(names.last(), Some(&"meeting"));
        let position = |name| names.iter().position(|n| *n == name).unwrap();
        assert!(position("voting_system") < position("motions"));
        assert!(position("users") < position("groups"));
        assert!(position("projectors") < position("reverse_relations"));
    }

    #[test]
    fn test_context_starts_with_the_meeting() {
        let store = test_support::run(json!({}), Vec::new()).unwrap();
        assert_eq!(store.ids("meeting"), vec![MEETING_ID]);
    }

    #[test]
    fn test_map_enum() {
        let model = object(json!({"id": 1, "type": 2}));
        let table = [(1, "common"), (2, "internal")];
        assert_eq!(map_enum("agenda/item", &model, "type", &table).unwrap(), "internal");
        let model = object(json!({"id": 1, "type": 7}));
        assert!(matches!(
            map_enum("agenda/item", &model, "type", &table),
            Err(MigrationError::InvalidValue { .. })
        ));
    }
}

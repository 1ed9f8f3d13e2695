use os4_export_shared::{Model, ModelExt};
use serde_json::{json, Value};

use super::{in_meeting, label, required, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::time::to_unix_time;

const COLLECTION: &str = "agenda/list-of-speakers";

/// Lists of speakers and the speakers embedded in them.
pub struct ListsOfSpeakers;

impl Migrate for ListsOfSpeakers {
    fn name(&self) -> &'static str {
        "lists_of_speakers"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&["id", "closed"]);
            let content_object = ctx
                .resolver
                .resolve_reference(required(COLLECTION, old, "content_object")?)?;
            new.insert("content_object_id".into(), content_object.into());

            let mut speaker_ids = Vec::new();
            if let Some(Value::Array(speakers)) = old.get("speakers") {
                for speaker in speakers.iter().filter_map(Value::as_object) {
                    let speaker = migrate_speaker(speaker, id);
                    speaker_ids.push(required_id("agenda/speaker", &speaker)?);
                    ctx.store.set_model("speaker", speaker)?;
                }
            }
            new.insert("speaker_ids".into(), json!(speaker_ids));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("list_of_speakers", new)?;
        }
        Ok(())
    }
}

fn migrate_speaker(old: &Model, list_of_speakers_id: i64) -> Model {
    let context = label("agenda/speaker", old);
    let mut new = old.copy_fields(&["id", "note", "point_of_order", "user_id", "weight"]);
    new.insert(
        "begin_time".into(),
        to_unix_time(old.get("begin_time"), &context),
    );
    new.insert("end_time".into(), to_unix_time(old.get("end_time"), &context));
    new.insert("speech_state".into(), speech_state(old));
    new.insert("list_of_speakers_id".into(), json!(list_of_speakers_id));
    in_meeting(&mut new);
    new
}

/// `marked` wins over `pro_speech`; a `pro_speech` of `null` means neither.
fn speech_state(old: &Model) -> Value {
    if old.flag("marked") {
        return json!("contribution");
    }
    match old.get("pro_speech") {
        Some(Value::Bool(true)) => json!("pro"),
        Some(Value::Bool(false)) => json!("contra"),
        _ => Value::Null,
    }
}

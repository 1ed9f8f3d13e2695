use os4_export_shared::ModelExt;
use serde_json::{json, Value};
use tracing::debug;

use super::{in_meeting, object, required_int, Migrate, MigrationContext};
use crate::errors::MigrationError;

const COLLECTION: &str = "users/personal-note";

/// Personal notes. The old model keeps one object per user holding all of
/// that user's notes; each note on an exported motion becomes its own
/// `personal_note` with a fresh id.
pub struct PersonalNotes;

impl Migrate for PersonalNotes {
    fn name(&self) -> &'static str {
        "personal_notes"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let mut next_id = 1;
        for old in ctx.snapshot.collection(COLLECTION) {
            let Some(Value::Object(notes)) = old
                .get("notes")
                .and_then(|notes| notes.get("motions/motion"))
            else {
                continue;
            };
            let user_id = required_int(COLLECTION, old, "user_id")?;

            for (motion_id, entry) in notes {
                let Ok(motion_id) = motion_id.parse::<i64>() else {
                    debug!(user_id, motion_id = %motion_id, "Skipping note with an invalid motion id");
                    continue;
                };
                let Some(entry) = entry.as_object() else {
                    continue;
                };
                let Some(note) = entry.text("note") else {
                    continue;
                };
                let Some(motion) = ctx.store.get_mut("motion", motion_id) else {
                    debug!(user_id, motion_id, "Skipping note on a missing motion");
                    continue;
                };
                motion.push_to("personal_note_ids", json!(next_id));

                let mut new = object(json!({
                    "id": next_id,
                    "user_id": user_id,
                    "content_object_id": format!("motion/{}", motion_id),
                    "note": note,
                    "star": entry.get("star").cloned().unwrap_or(json!(false)),
                }));
                in_meeting(&mut new);
                ctx.store.set_model("personal_note", new)?;
                next_id += 1;
            }
        }
        Ok(())
    }
}

use os4_export_shared::{Model, ModelExt};
use serde_json::{json, Value};

use super::{id_list, in_meeting, map_enum, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;

const COLLECTION: &str = "assignments/assignment";

const PHASES: [(i64, &str); 3] = [(0, "search"), (1, "voting"), (2, "finished")];

/// Assignments and their candidates. Runs after the voting system so that
/// `poll_ids` can be read from the migrated polls.
pub struct Assignments;

impl Migrate for Assignments {
    fn name(&self) -> &'static str {
        "assignments"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let mut polls = relations::by_text(ctx.store.iter("poll"), "content_object_id");

        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "description",
                "open_posts",
                "default_poll_description",
                "number_poll_candidates",
                "agenda_item_id",
                "list_of_speakers_id",
            ]);
            new.insert("phase".into(), json!(map_enum(COLLECTION, old, "phase", &PHASES)?));

            let mut candidate_ids = Vec::new();
            if let Some(Value::Array(candidates)) = old.get("assignment_related_users") {
                for candidate in candidates.iter().filter_map(Value::as_object) {
                    let candidate = migrate_candidate(candidate, id);
                    candidate_ids.push(required_id("assignment_related_user", &candidate)?);
                    ctx.store.set_model("assignment_candidate", candidate)?;
                }
            }
            new.insert("candidate_ids".into(), json!(candidate_ids));
            new.insert(
                "poll_ids".into(),
                json!(relations::take(&mut polls, &format!("assignment/{}", id))),
            );
            new.insert("attachment_ids".into(), id_list(old, "attachments_id"));
            new.insert("tag_ids".into(), id_list(old, "tags_id"));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("assignment", new)?;
        }
        Ok(())
    }
}

fn migrate_candidate(old: &Model, assignment_id: i64) -> Model {
    let mut new = old.copy_fields(&["id", "weight", "user_id"]);
    new.insert("assignment_id".into(), json!(assignment_id));
    in_meeting(&mut new);
    new
}

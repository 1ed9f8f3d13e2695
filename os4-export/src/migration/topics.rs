use os4_export_shared::ModelExt;
use serde_json::json;

use super::{id_list, in_meeting, Migrate, MigrationContext};
use crate::errors::MigrationError;

const COLLECTION: &str = "topics/topic";

pub struct Topics;

impl Migrate for Topics {
    fn name(&self) -> &'static str {
        "topics"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection(COLLECTION) {
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "text",
                "agenda_item_id",
                "list_of_speakers_id",
            ]);
            new.insert("attachment_ids".into(), id_list(old, "attachments_id"));
            new.insert("option_ids".into(), json!([]));
            new.insert("tag_ids".into(), json!([]));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("topic", new)?;
        }
        Ok(())
    }
}

use os4_export_shared::{ModelExt, OldCollection};
use serde_json::{json, Value};
use tracing::instrument;

use super::{
    id_list, in_meeting, label, required_id, reverse_fqids, Migrate, MigrationContext,
};
use crate::errors::MigrationError;
use crate::relations;
use crate::time::to_unix_time;

const COLLECTION: &str = "mediafiles/mediafile";

const ATTACHABLE: [OldCollection; 3] = [
    OldCollection::Topic,
    OldCollection::Motion,
    OldCollection::Assignment,
];

/// Mediafiles with their payloads. Logo and font usage is filled in by the
/// meeting stage.
pub struct Mediafiles;

impl Migrate for Mediafiles {
    fn name(&self) -> &'static str {
        "mediafiles"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let mediafiles = ctx.snapshot.collection(COLLECTION);
        let mut children = relations::by_key(mediafiles, "parent_id");
        let mut attachments = reverse_fqids(ctx, "attachments_id", &ATTACHABLE);

        for old in mediafiles {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "is_directory",
                "mimetype",
                "pdf_information",
                "parent_id",
                "list_of_speakers_id",
            ]);

            match ctx.blobs.read_blob(id, old.flag("is_directory"))? {
                Some(blob) => {
                    new.insert("filename".into(), json!(blob.filename));
                    new.insert("filesize".into(), json!(blob.filesize));
                    new.insert("blob".into(), json!(blob.blob));
                }
                None => {
                    new.insert(
                        "filename".into(),
                        old.get("title").cloned().unwrap_or(Value::Null),
                    );
                    new.insert("filesize".into(), json!(0));
                    new.insert("blob".into(), Value::Null);
                }
            }

            new.insert(
                "create_timestamp".into(),
                to_unix_time(old.get("create_timestamp"), &label(COLLECTION, old)),
            );
            new.insert("access_group_ids".into(), id_list(old, "access_groups_id"));

            // `true` marks a public file, `false` a file nobody may access
            // through inheritance; a list names the inherited groups.
            let inherited = old.get("inherited_access_groups_id");
            new.insert(
                "is_public".into(),
                json!(matches!(inherited, Some(Value::Bool(true)))),
            );
            new.insert(
                "inherited_access_group_ids".into(),
                json!(old.ids("inherited_access_groups_id")),
            );

            new.insert("child_ids".into(), json!(relations::take(&mut children, &id)));
            new.insert(
                "attachment_ids".into(),
                json!(attachments.remove(&id).unwrap_or_default()),
            );
            new.insert("projection_ids".into(), json!([]));
            new.insert("used_as_logo_$_in_meeting_id".into(), json!([]));
            new.insert("used_as_font_$_in_meeting_id".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("mediafile", new)?;
        }
        Ok(())
    }
}

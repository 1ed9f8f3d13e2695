use os4_export_shared::ModelExt;
use serde_json::json;
use tracing::instrument;

use super::{id_list, in_meeting, map_enum, required, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;

const COLLECTION: &str = "agenda/item";

const ITEM_TYPES: [(i64, &str); 3] = [(1, "common"), (2, "internal"), (3, "hidden")];

/// Agenda items. `child_ids` is recomputed from `parent_id`.
pub struct AgendaItems;

impl Migrate for AgendaItems {
    fn name(&self) -> &'static str {
        "agenda_items"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let items = ctx.snapshot.collection(COLLECTION);
        let mut children = relations::by_key(items, "parent_id");

        for old in items {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&[
                "id",
                "item_number",
                "comment",
                "closed",
                "is_internal",
                "is_hidden",
                "level",
                "weight",
                "parent_id",
            ]);
            new.insert("type".into(), json!(map_enum(COLLECTION, old, "type", &ITEM_TYPES)?));
            new.insert(
                "duration".into(),
                old.get("duration").cloned().unwrap_or(json!(0)),
            );
            let content_object = ctx
                .resolver
                .resolve_reference(required(COLLECTION, old, "content_object")?)?;
            new.insert("content_object_id".into(), content_object.into());
            new.insert("child_ids".into(), json!(relations::take(&mut children, &id)));
            new.insert("tag_ids".into(), id_list(old, "tags_id"));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("agenda_item", new)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support;
    use std::sync::Arc;

    #[test]
    fn test_children_are_recomputed() {
        let store = test_support::run(
            json!({"agenda/item": [
                {"id": 1, "type": 1, "parent_id": null, "child_ids": [9],
                 "content_object": {"collection": "topics/topic", "id": 4}, "tags_id": [2]},
                {"id": 2, "type": 3, "parent_id": 1, "duration": 30,
                 "content_object": {"collection": "motions/motion", "id": 5}, "tags_id": []},
            ]}),
            vec![Arc::new(AgendaItems)],
        )
        .unwrap();

        let parent = store.get("agenda_item", 1).unwrap();
        assert_eq!(parent["child_ids"], json!([2]));
        assert_eq!(parent["type"], json!("common"));
        assert_eq!(parent["duration"], json!(0));
        assert_eq!(parent["content_object_id"], json!("topic/4"));
        assert_eq!(parent["tag_ids"], json!([2]));

        let child = store.get("agenda_item", 2).unwrap();
        assert_eq!(child["type"], json!("hidden"));
        assert_eq!(child["duration"], json!(30));
        assert_eq!(child["meeting_id"], json!(1));
    }

    #[test]
    fn test_unknown_content_collection_fails() {
        let result = test_support::run(
            json!({"agenda/item": [
                {"id": 1, "type": 1, "content_object": {"collection": "core/tag", "id": 1}},
            ]}),
            vec![Arc::new(AgendaItems)],
        );
        assert!(matches!(result, Err(MigrationError::UnknownCollection(_))));
    }
}

use os4_export_shared::{ModelExt, OldCollection};
use serde_json::json;

use super::{in_meeting, required_id, reverse_fqids, Migrate, MigrationContext};
use crate::errors::MigrationError;

const COLLECTION: &str = "core/tag";

const TAGGABLE: [OldCollection; 4] = [
    OldCollection::AgendaItem,
    OldCollection::Topic,
    OldCollection::Motion,
    OldCollection::Assignment,
];

pub struct Tags;

impl Migrate for Tags {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let mut tagged = reverse_fqids(ctx, "tags_id", &TAGGABLE);
        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&["id", "name"]);
            new.insert(
                "tagged_ids".into(),
                json!(tagged.remove(&id).unwrap_or_default()),
            );
            in_meeting(&mut new);
            ctx.store.set_model("tag", new)?;
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
    fn test_tagged_ids_follow_collection_order() {
        let store = test_support::run(
            json!({
                "core/tag": [{"id": 1, "name": "Finance"}, {"id": 2, "name": "Unused"}],
                "motions/motion": [{"id": 4, "tags_id": [1, 1]}],
                "agenda/item": [{"id": 7, "tags_id": [1]}],
                "assignments/assignment": [{"id": 2, "tags_id": [1]}],
                "topics/topic": [{"id": 3, "tags_id": []}],
            }),
            vec![Arc::new(Tags)],
        )
        .unwrap();

        assert_eq!(
            store.get("tag", 1).unwrap()["tagged_ids"],
            json!(["agenda_item/7", "motion/4", "assignment/2"])
        );
        assert_eq!(store.get("tag", 2).unwrap()["tagged_ids"], json!([]));
    }
}

//! The smaller motion collections. Their `motion_ids` and `comment_ids`
//! start empty and are filled by the reverse relation stage.

use os4_export_shared::ModelExt;
use serde_json::json;

use super::{id_list, in_meeting, label, map_enum, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;
use crate::time::to_unix_time;

pub struct MotionCommentSections;

impl Migrate for MotionCommentSections {
    fn name(&self) -> &'static str {
        "motion_comment_sections"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection("motions/motion-comment-section") {
            let mut new = old.copy_fields(&["id", "name", "weight"]);
            new.insert("read_group_ids".into(), id_list(old, "read_groups_id"));
            new.insert("write_group_ids".into(), id_list(old, "write_groups_id"));
            new.insert("comment_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("motion_comment_section", new)?;
        }
        Ok(())
    }
}

pub struct MotionBlocks;

impl Migrate for MotionBlocks {
    fn name(&self) -> &'static str {
        "motion_blocks"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection("motions/motion-block") {
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "internal",
                "agenda_item_id",
                "list_of_speakers_id",
            ]);
            new.insert("motion_ids".into(), json!([]));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("motion_block", new)?;
        }
        Ok(())
    }
}

/// Categories. `child_ids` is recomputed from `parent_id`.
pub struct MotionCategories;

impl Migrate for MotionCategories {
    fn name(&self) -> &'static str {
        "motion_categories"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        const COLLECTION: &str = "motions/category";
        let categories = ctx.snapshot.collection(COLLECTION);
        let mut children = relations::by_key(categories, "parent_id");

        for old in categories {
            let id = required_id(COLLECTION, old)?;
            let mut new =
                old.copy_fields(&["id", "name", "prefix", "weight", "level", "parent_id"]);
            new.insert("child_ids".into(), json!(relations::take(&mut children, &id)));
            new.insert("motion_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("motion_category", new)?;
        }
        Ok(())
    }
}

const RECOMMENDATION_TYPES: [(i64, &str); 4] = [
    (0, "replacement"),
    (1, "insertion"),
    (2, "deletion"),
    (3, "other"),
];

pub struct MotionChangeRecommendations;

impl Migrate for MotionChangeRecommendations {
    fn name(&self) -> &'static str {
        "motion_change_recommendations"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        const COLLECTION: &str = "motions/motion-change-recommendation";
        for old in ctx.snapshot.collection(COLLECTION) {
            let mut new = old.copy_fields(&[
                "id",
                "rejected",
                "internal",
                "other_description",
                "line_from",
                "line_to",
                "text",
                "motion_id",
            ]);
            new.insert(
                "type".into(),
                json!(map_enum(COLLECTION, old, "type", &RECOMMENDATION_TYPES)?),
            );
            new.insert(
                "creation_time".into(),
                to_unix_time(old.get("creation_time"), &label(COLLECTION, old)),
            );
            in_meeting(&mut new);
            ctx.store.set_model("motion_change_recommendation", new)?;
        }
        Ok(())
    }
}

pub struct MotionStatuteParagraphs;

impl Migrate for MotionStatuteParagraphs {
    fn name(&self) -> &'static str {
        "motion_statute_paragraphs"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection("motions/statute-paragraph") {
            let mut new = old.copy_fields(&["id", "title", "text", "weight"]);
            new.insert("motion_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("motion_statute_paragraph", new)?;
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
    fn test_category_children() {
        let store = test_support::run(
            json!({"motions/category": [
                {"id": 1, "name": "A", "prefix": "A", "weight": 1, "level": 0, "parent_id": null},
                {"id": 2, "name": "A.1", "prefix": "A1", "weight": 2, "level": 1, "parent_id": 1},
                {"id": 3, "name": "A.2", "prefix": "A2", "weight": 3, "level": 1, "parent_id": 1},
            ]}),
            vec![Arc::new(MotionCategories)],
        )
        .unwrap();
        assert_eq!(store.get("motion_category", 1).unwrap()["child_ids"], json!([2, 3]));
        assert_eq!(store.get("motion_category", 2).unwrap()["child_ids"], json!([]));
    }

    #[test]
    fn test_change_recommendation_type() {
        let store = test_support::run(
            json!({"motions/motion-change-recommendation": [
                {"id": 1, "rejected": false, "internal": false, "other_description": "",
                 "line_from": 3, "line_to": 4, "text": "<p>x</p>", "motion_id": 2, "type": 2,
                 "creation_time": "2021-03-01T10:00:00+00:00"},
            ]}),
            vec![Arc::new(MotionChangeRecommendations)],
        )
        .unwrap();
        let recommendation = store.get("motion_change_recommendation", 1).unwrap();
        assert_eq!(recommendation["type"], json!("deletion"));
        assert_eq!(recommendation["creation_time"], json!(1614592800));
    }

    #[test]
    fn test_comment_section_groups() {
        let store = test_support::run(
            json!({"motions/motion-comment-section": [
                {"id": 1, "name": "Notes", "weight": 1, "read_groups_id": [2, 3],
                 "write_groups_id": [2]},
            ]}),
            vec![Arc::new(MotionCommentSections)],
        )
        .unwrap();
        let section = store.get("motion_comment_section", 1).unwrap();
        assert_eq!(section["read_group_ids"], json!([2, 3]));
        assert_eq!(section["write_group_ids"], json!([2]));
    }
}

use std::collections::HashMap;

use lazy_static::lazy_static;
use os4_export_shared::{Model, ModelExt, TemplateField};
use regex::{Captures, Regex};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{field, id_list, in_meeting, label, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;
use crate::time::to_unix_time;

const COLLECTION: &str = "motions/motion";

lazy_static! {
    static ref MOTION_REFERENCE: Regex = Regex::new(r"\[motion:(?P<id>\d+)\]").unwrap();
}

/// Motions with their submitters and comments. Runs after the voting system
/// so that `poll_ids` and `option_ids` can be read from the store.
pub struct Motions;

impl Migrate for Motions {
    fn name(&self) -> &'static str {
        "motions"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let motions = ctx.snapshot.collection(COLLECTION);
        let mut amendments = relations::by_key(motions, "parent_id");
        let mut sort_children = relations::by_key(motions, "sort_parent_id");
        let mut polls = relations::by_text(ctx.store.iter("poll"), "content_object_id");
        let mut options = relations::by_text(ctx.store.iter("option"), "content_object_id");
        let mut referrers: HashMap<String, Vec<i64>> = HashMap::new();

        for old in motions {
            let id = required_id(COLLECTION, old)?;
            let fqid = format!("motion/{}", id);
            let context = label(COLLECTION, old);
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "text",
                "modified_final_version",
                "reason",
                "category_weight",
                "state_extension",
                "recommendation_extension",
                "state_id",
                "recommendation_id",
                "category_id",
                "statute_paragraph_id",
                "agenda_item_id",
                "list_of_speakers_id",
            ]);
            new.insert("number".into(), field(old, "identifier"));
            new.insert("number_value".into(), field(old, "identifier_number"));
            new.insert("sequential_number".into(), json!(id));

            let paragraphs = TemplateField::new("amendment_paragraph_$");
            paragraphs.init(&mut new);
            if let Some(Value::Array(contents)) = old.get("amendment_paragraphs") {
                for (index, content) in contents.iter().enumerate() {
                    paragraphs.add(&mut new, &(index + 1).to_string(), content.clone());
                }
            }

            new.insert("sort_weight".into(), field(old, "weight"));
            new.insert("created".into(), to_unix_time(old.get("created"), &context));
            new.insert(
                "last_modified".into(),
                to_unix_time(old.get("last_modified"), &context),
            );

            new.insert("lead_motion_id".into(), field(old, "parent_id"));
            new.insert("amendment_ids".into(), json!(relations::take(&mut amendments, &id)));
            new.insert("sort_parent_id".into(), field(old, "sort_parent_id"));
            new.insert(
                "sort_child_ids".into(),
                json!(relations::take(&mut sort_children, &id)),
            );
            new.insert("origin_id".into(), Value::Null);
            new.insert("derived_motion_ids".into(), json!([]));
            new.insert("all_origin_ids".into(), json!([]));
            new.insert("all_derived_motion_ids".into(), json!([]));
            new.insert("block_id".into(), field(old, "motion_block_id"));

            let mut submitter_ids = Vec::new();
            for submitter in embedded(old, "submitters") {
                let mut submitter = submitter.copy_fields(&["id", "motion_id", "weight", "user_id"]);
                in_meeting(&mut submitter);
                submitter_ids.push(required_id("motions/submitter", &submitter)?);
                ctx.store.set_model("motion_submitter", submitter)?;
            }
            new.insert("submitter_ids".into(), json!(submitter_ids));
            new.insert("supporter_ids".into(), id_list(old, "supporters_id"));
            new.insert("poll_ids".into(), json!(relations::take(&mut polls, &fqid)));
            new.insert("option_ids".into(), json!(relations::take(&mut options, &fqid)));
            new.insert(
                "change_recommendation_ids".into(),
                id_list(old, "change_recommendations_id"),
            );

            let mut comment_ids = Vec::new();
            for comment in embedded(old, "comments") {
                let mut comment = comment.copy_fields(&["id", "section_id", "comment"]);
                comment.insert("motion_id".into(), json!(id));
                in_meeting(&mut comment);
                comment_ids.push(required_id("motions/motion-comment", &comment)?);
                ctx.store.set_model("motion_comment", comment)?;
            }
            new.insert("comment_ids".into(), json!(comment_ids));

            new.insert("tag_ids".into(), id_list(old, "tags_id"));
            new.insert("attachment_ids".into(), id_list(old, "attachments_id"));
            new.insert("personal_note_ids".into(), json!([]));
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);

            let references = rewrite_references(&mut new);
            for reference in &references {
                let group = referrers.entry(reference.clone()).or_default();
                if group.last() != Some(&id) {
                    group.push(id);
                }
            }
            new.insert("recommendation_extension_reference_ids".into(), json!(references));
            ctx.store.set_model("motion", new)?;
        }

        for motion in ctx.store.iter_mut("motion") {
            let fqid = match motion.id() {
                Some(id) => format!("motion/{}", id),
                None => continue,
            };
            let referenced_in = referrers.remove(&fqid).unwrap_or_default();
            motion.insert(
                "referenced_in_motion_recommendation_extension_ids".into(),
                json!(referenced_in),
            );
        }
        Ok(())
    }
}

/// The objects of an embedded list, e.g. the `submitters` of a motion.
fn embedded<'m>(old: &'m Model, name: &str) -> impl Iterator<Item = &'m Model> {
    old.get(name)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Rewrite `[motion:<id>]` references in the recommendation extension to
/// `[motion/<id>]` and return the referenced fqids in text order.
fn rewrite_references(motion: &mut Model) -> Vec<String> {
    let mut references = Vec::new();
    let Some(extension) = motion.text("recommendation_extension") else {
        return references;
    };
    if extension.is_empty() {
        return references;
    }

    let rewritten = MOTION_REFERENCE
        .replace_all(extension, |caps: &Captures| match caps["id"].parse::<i64>() {
            Ok(id) => {
                references.push(format!("motion/{}", id));
                format!("[motion/{}]", id)
            }
            Err(_) => {
                debug!(reference = &caps[0], "Motion reference out of range, keeping it");
                caps[0].to_string()
            }
        })
        .into_owned();
    motion.insert("recommendation_extension".into(), json!(rewritten));
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{object, test_support};
    use crate::migration::voting::VotingSystem;
    use std::sync::Arc;

    #[test]
    fn test_rewrite_references() {
        let mut motion = object(json!({
            "recommendation_extension": "See [motion:12] and [motion:007], not [motion:x]",
        }));
        let references = rewrite_references(&mut motion);
        assert_eq!(references, vec!["motion/12", "motion/7"]);
        assert_eq!(
            motion["recommendation_extension"],
            json!("See [motion/12] and [motion/7], not [motion:x]")
        );

        let mut empty = object(json!({"recommendation_extension": null}));
        assert!(rewrite_references(&mut empty).is_empty());
        assert_eq!(empty["recommendation_extension"], Value::Null);
    }

    fn motion(id: i64, extension: &str) -> Value {
        json!({
            "id": id, "title": format!("Motion {}", id), "text": "", "identifier": format!("A{}", id),
            "identifier_number": id, "weight": 10 * id, "parent_id": null, "sort_parent_id": null,
            "created": "2021-03-01T10:00:00+00:00", "last_modified": "2021-03-01T10:00:00Z",
            "recommendation_extension": extension, "motion_block_id": null,
            "amendment_paragraphs": null, "submitters": [], "supporters_id": [],
            "change_recommendations_id": [], "comments": [], "tags_id": [], "attachments_id": [],
        })
    }

    #[test]
    fn test_references_are_indexed_on_the_referenced_motion() {
        let store = test_support::run(
            json!({"motions/motion": [
                motion(1, "[motion:3] [motion:3]"),
                motion(2, "[motion:3] and [motion:1]"),
                motion(3, ""),
            ]}),
            vec![Arc::new(Motions)],
        )
        .unwrap();

        let first = store.get("motion", 1).unwrap();
        assert_eq!(
            first["recommendation_extension_reference_ids"],
            json!(["motion/3", "motion/3"])
        );
        assert_eq!(
            first["referenced_in_motion_recommendation_extension_ids"],
            json!([2])
        );
        assert_eq!(
            store.get("motion", 3).unwrap()["referenced_in_motion_recommendation_extension_ids"],
            json!([1, 2])
        );
        assert_eq!(
            store.get("motion", 2).unwrap()["referenced_in_motion_recommendation_extension_ids"],
            json!([])
        );
    }

    #[test]
    fn test_motion_fields() {
        let mut lead = motion(1, "");
        lead["amendment_paragraphs"] = json!(["<p>one</p>", "<p>two</p>"]);
        lead["submitters"] = json!([{"id": 4, "motion_id": 1, "weight": 1, "user_id": 7}]);
        lead["comments"] = json!([{"id": 9, "section_id": 2, "comment": "ok"}]);
        lead["supporters_id"] = json!([7, 8]);
        let mut amendment = motion(2, "");
        amendment["parent_id"] = json!(1);
        amendment["sort_parent_id"] = json!(1);

        let store = test_support::run(
            json!({
                "motions/motion": [lead, amendment],
                "motions/motion-poll": [{
                    "id": 1, "title": "1", "type": "analog", "pollmethod": "YNA", "state": 1,
                    "motion_id": 1, "groups_id": [], "voted_id": [],
                }],
                "motions/motion-option": [{"id": 1, "poll_id": 1}],
            }),
            vec![Arc::new(VotingSystem), Arc::new(Motions)],
        )
        .unwrap();

        let lead = store.get("motion", 1).unwrap();
        assert_eq!(lead["number"], json!("A1"));
        assert_eq!(lead["number_value"], json!(1));
        assert_eq!(lead["sequential_number"], json!(1));
        assert_eq!(lead["sort_weight"], json!(10));
        assert_eq!(lead["created"], json!(1614592800));
        assert_eq!(lead["amendment_paragraph_$"], json!(["1", "2"]));
        assert_eq!(lead["amendment_paragraph_$2"], json!("<p>two</p>"));
        assert_eq!(lead["amendment_ids"], json!([2]));
        assert_eq!(lead["sort_child_ids"], json!([2]));
        assert_eq!(lead["submitter_ids"], json!([4]));
        assert_eq!(lead["supporter_ids"], json!([7, 8]));
        assert_eq!(lead["comment_ids"], json!([9]));
        assert_eq!(lead["poll_ids"], json!([1]));
        assert_eq!(lead["option_ids"], json!([1]));

        let amendment = store.get("motion", 2).unwrap();
        assert_eq!(amendment["lead_motion_id"], json!(1));
        assert_eq!(amendment["amendment_paragraph_$"], json!([]));

        assert_eq!(store.get("motion_comment", 9).unwrap()["motion_id"], json!(1));
        assert_eq!(store.get("motion_submitter", 4).unwrap()["user_id"], json!(7));
    }
}

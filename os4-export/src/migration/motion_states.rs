use os4_export_shared::ModelExt;
use serde_json::{json, Value};
use tracing::warn;

use super::{id_list, in_meeting, map_enum, required_id, required_int, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;

const CSS_CLASSES: [&str; 5] = ["grey", "red", "green", "lightblue", "yellow"];

const DEFAULT_CSS_CLASS: &str = "lightblue";

const RESTRICTIONS: [(&str, &str); 5] = [
    ("motions.can_see_internal", "motion.can_see_internal"),
    ("motions.can_manage_metadata", "motion.can_manage_metadata"),
    ("motions.can_manage", "motion.can_manage"),
    // Removed in OS3 but still found in old data.
    ("managers_only", "motion.can_manage"),
    ("is_submitter", "is_submitter"),
];

const MERGE_MODES: [(i64, &str); 3] = [(-1, "do_not_merge"), (0, "undefined"), (1, "do_merge")];

/// Motion states. `first_state_of_workflow_id` is stamped by
/// [`MotionWorkflows`]; the motion lists are filled by the reverse relation
/// stage.
pub struct MotionStates;

impl Migrate for MotionStates {
    fn name(&self) -> &'static str {
        "motion_states"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        const COLLECTION: &str = "motions/state";
        let states = ctx.snapshot.collection(COLLECTION);
        let mut previous = relations::by_member(states, "next_states_id");

        for old in states {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&[
                "id",
                "name",
                "recommendation_label",
                "allow_support",
                "allow_create_poll",
                "allow_submitter_edit",
                "show_state_extension_field",
                "show_recommendation_extension_field",
                "workflow_id",
            ]);
            let css_class = old
                .text("css_class")
                .filter(|class| CSS_CLASSES.contains(class))
                .unwrap_or(DEFAULT_CSS_CLASS);
            new.insert("css_class".into(), json!(css_class));
            new.insert("weight".into(), json!(id));
            new.insert("restrictions".into(), json!(migrate_restrictions(id, old.get("restriction"))));
            new.insert("set_number".into(), json!(!old.flag("dont_set_identifier")));
            new.insert(
                "merge_amendment_into_final".into(),
                json!(map_enum(COLLECTION, old, "merge_amendment_into_final", &MERGE_MODES)?),
            );
            new.insert("next_state_ids".into(), id_list(old, "next_states_id"));
            new.insert(
                "previous_state_ids".into(),
                json!(relations::take(&mut previous, &id)),
            );
            new.insert("motion_ids".into(), json!([]));
            new.insert("motion_recommendation_ids".into(), json!([]));
            new.insert("first_state_of_workflow_id".into(), Value::Null);
            in_meeting(&mut new);
            ctx.store.set_model("motion_state", new)?;
        }
        Ok(())
    }
}

/// Map old restriction tokens. Unknown tokens are dropped.
fn migrate_restrictions(state_id: i64, restrictions: Option<&Value>) -> Vec<&'static str> {
    let Some(Value::Array(restrictions)) = restrictions else {
        return Vec::new();
    };
    restrictions
        .iter()
        .filter_map(|restriction| {
            let token = restriction.as_str().unwrap_or_default();
            let mapped = RESTRICTIONS
                .iter()
                .find(|(old, _)| *old == token)
                .map(|(_, new)| *new);
            if mapped.is_none() {
                warn!(state_id, restriction = %restriction, "Ignoring invalid motion state restriction");
            }
            mapped
        })
        .collect()
}

pub struct MotionWorkflows;

impl Migrate for MotionWorkflows {
    fn name(&self) -> &'static str {
        "motion_workflows"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        const COLLECTION: &str = "motions/workflow";
        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&["id", "name", "first_state_id"]);
            new.insert("state_ids".into(), id_list(old, "states_id"));

            let first_state_id = required_int(COLLECTION, old, "first_state_id")?;
            ctx.store
                .model_mut("motion_state", first_state_id)?
                .insert("first_state_of_workflow_id".into(), json!(id));

            // Set by the meeting stage.
            new.insert("default_workflow_meeting_id".into(), Value::Null);
            new.insert("default_amendment_workflow_meeting_id".into(), Value::Null);
            new.insert(
                "default_statute_amendment_workflow_meeting_id".into(),
                Value::Null,
            );
            in_meeting(&mut new);
            ctx.store.set_model("motion_workflow", new)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support;
    use std::sync::Arc;

    fn state(id: i64, next: Value) -> Value {
        json!({
            "id": id, "name": format!("state {}", id), "recommendation_label": null,
            "css_class": "primary", "restriction": [], "allow_support": false,
            "allow_create_poll": true, "allow_submitter_edit": false,
            "dont_set_identifier": false, "show_state_extension_field": false,
            "merge_amendment_into_final": 0, "show_recommendation_extension_field": false,
            "next_states_id": next, "workflow_id": 1,
        })
    }

    #[test]
    fn test_restrictions_drop_unknown_tokens() {
        let restrictions = json!(["managers_only", "motions.can_see_internal", "gone", 7]);
        assert_eq!(
            migrate_restrictions(1, Some(&restrictions)),
            vec!["motion.can_manage", "motion.can_see_internal"]
        );
        assert!(migrate_restrictions(1, None).is_empty());
    }

    #[test]
    fn test_states_and_workflow() {
        let mut first = state(1, json!([2, 3]));
        first["css_class"] = json!("green");
        let mut second = state(2, json!([3]));
        second["dont_set_identifier"] = json!(true);
        second["merge_amendment_into_final"] = json!(-1);

        let store = test_support::run(
            json!({
                "motions/state": [first, second, state(3, json!([]))],
                "motions/workflow": [
                    {"id": 1, "name": "Simple", "first_state_id": 1, "states_id": [1, 2, 3]},
                ],
            }),
            vec![Arc::new(MotionStates), Arc::new(MotionWorkflows)],
        )
        .unwrap();

        let first = store.get("motion_state", 1).unwrap();
        assert_eq!(first["css_class"], json!("green"));
        assert_eq!(first["first_state_of_workflow_id"], json!(1));
        assert_eq!(first["merge_amendment_into_final"], json!("undefined"));

        let second = store.get("motion_state", 2).unwrap();
        assert_eq!(second["css_class"], json!("lightblue"));
        assert_eq!(second["set_number"], json!(false));
        assert_eq!(second["merge_amendment_into_final"], json!("do_not_merge"));
        assert_eq!(second["previous_state_ids"], json!([1]));
        assert_eq!(second["first_state_of_workflow_id"], Value::Null);

        assert_eq!(
            store.get("motion_state", 3).unwrap()["previous_state_ids"],
            json!([1, 2])
        );
        assert_eq!(
            store.get("motion_workflow", 1).unwrap()["state_ids"],
            json!([1, 2, 3])
        );
    }

    #[test]
    fn test_workflow_with_missing_first_state_fails() {
        let result = test_support::run(
            json!({"motions/workflow": [
                {"id": 1, "name": "Broken", "first_state_id": 9, "states_id": []},
            ]}),
            vec![Arc::new(MotionStates), Arc::new(MotionWorkflows)],
        );
        assert!(matches!(result, Err(MigrationError::MissingModel { .. })));
    }
}

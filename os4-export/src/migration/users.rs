use std::collections::HashMap;

use os4_export_shared::{Model, ModelExt, TemplateField, MEETING_ID};
use serde_json::{json, Value};
use tracing::instrument;

use super::{field, label, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;
use crate::time::to_unix_time;

const COLLECTION: &str = "users/user";

const GROUP_COLLECTION: &str = "users/group";

const GENDERS: [&str; 3] = ["male", "female", "diverse"];

const DEFAULT_GROUP_ID: i64 = 1;

const ADMIN_GROUP_ID: i64 = 2;

const CHANGE_PASSWORD_PERMISSION: &str = "users.can_change_password";

/// Template fields that only hold meeting data the export never produces.
const EMPTY_TEMPLATES: [&str; 7] = [
    "committee_$_management_level",
    "comment_$",
    "number_$",
    "structure_level_$",
    "about_me_$",
    "vote_weight_$",
    "projection_$_ids",
];

/// Per-user reverse relations over already migrated collections, each
/// emitted as a meeting-scoped template field.
struct UserIndexes {
    by_id: Vec<(&'static str, HashMap<i64, Vec<i64>>)>,
    options: HashMap<String, Vec<i64>>,
}

impl UserIndexes {
    fn build(ctx: &MigrationContext<'_>) -> Self {
        let store = &ctx.store;
        let by_id = vec![
            ("speaker_$_ids", relations::by_key(store.iter("speaker"), "user_id")),
            (
                "personal_note_$_ids",
                relations::by_key(store.iter("personal_note"), "user_id"),
            ),
            (
                "supported_motion_$_ids",
                relations::by_member(store.iter("motion"), "supporter_ids"),
            ),
            (
                "submitted_motion_$_ids",
                relations::by_key(store.iter("motion_submitter"), "user_id"),
            ),
            ("poll_voted_$_ids", relations::by_member(store.iter("poll"), "voted_ids")),
            ("vote_$_ids", relations::by_key(store.iter("vote"), "user_id")),
            (
                "vote_delegated_vote_$_ids",
                relations::by_key(store.iter("vote"), "delegated_user_id"),
            ),
            (
                "assignment_candidate_$_ids",
                relations::by_key(store.iter("assignment_candidate"), "user_id"),
            ),
        ];
        Self {
            by_id,
            options: relations::by_text(store.iter("option"), "content_object_id"),
        }
    }

    fn apply(&mut self, user: &mut Model, user_id: i64) {
        for (template, index) in self.by_id.iter_mut() {
            let ids = relations::take(index, &user_id);
            TemplateField::new(*template).set_for_meeting(user, json!(ids));
        }
        let options = relations::take(&mut self.options, &format!("user/{}", user_id));
        TemplateField::new("option_$_ids").set_for_meeting(user, json!(options));
    }
}

/// Users. Runs after every collection a user can be referenced from.
pub struct Users;

impl Migrate for Users {
    fn name(&self) -> &'static str {
        "users"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let mut indexes = UserIndexes::build(ctx);

        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let context = label(COLLECTION, old);
            let mut new = old.copy_fields(&[
                "id",
                "username",
                "title",
                "first_name",
                "last_name",
                "is_active",
                "default_password",
                "gender",
                "email",
            ]);
            let gender = old.text("gender").filter(|gender| GENDERS.contains(gender));
            new.insert("gender".into(), json!(gender));

            new.insert("is_physical_person".into(), json!(!old.flag("is_committee")));
            new.insert("password".into(), json!(""));
            new.insert("default_number".into(), field(old, "number"));
            new.insert("default_structure_level".into(), field(old, "structure_level"));
            new.insert("default_vote_weight".into(), field(old, "vote_weight"));
            new.insert(
                "last_email_send".into(),
                to_unix_time(old.get("last_email_send"), &context),
            );
            new.insert(
                "is_demo_user".into(),
                json!(ctx.settings.is_demo_user(id)),
            );
            new.insert("organization_management_level".into(), Value::Null);
            let present: &[i64] = if old.flag("is_present") { &[MEETING_ID] } else { &[] };
            new.insert("is_present_in_meeting_ids".into(), json!(present));
            new.insert("committee_ids".into(), json!([]));
            for template in EMPTY_TEMPLATES {
                TemplateField::new(template).init(&mut new);
            }

            let mut group_ids = old.ids("groups_id");
            if group_ids.is_empty() {
                group_ids.push(DEFAULT_GROUP_ID);
            }
            new.insert(
                "can_change_own_password".into(),
                json!(can_change_own_password(ctx, &group_ids)?),
            );
            TemplateField::new("group_$_ids").set_for_meeting(&mut new, json!(group_ids));

            indexes.apply(&mut new, id);

            TemplateField::new("vote_delegated_$_to_id")
                .set_for_meeting(&mut new, field(old, "vote_delegated_to_id"));
            TemplateField::new("vote_delegations_$_from_ids")
                .set_for_meeting(&mut new, old.ids("vote_delegated_from_users_id"));
            new.insert("meeting_ids".into(), json!([MEETING_ID]));
            TemplateField::new("chat_message_$_ids").init(&mut new);
            ctx.store.set_model("user", new)?;
        }
        Ok(())
    }
}

/// Members of the admin group, and of any group holding the old change
/// password permission, may change their own password.
fn can_change_own_password(
    ctx: &MigrationContext<'_>,
    group_ids: &[i64],
) -> Result<bool, MigrationError> {
    for &group_id in group_ids {
        let group = ctx
            .snapshot
            .get(GROUP_COLLECTION, group_id)
            .ok_or_else(|| MigrationError::missing_model(GROUP_COLLECTION, group_id))?;
        let has_permission = group
            .get("permissions")
            .and_then(Value::as_array)
            .is_some_and(|permissions| {
                permissions
                    .iter()
                    .any(|permission| permission.as_str() == Some(CHANGE_PASSWORD_PERMISSION))
            });
        if group_id == ADMIN_GROUP_ID || has_permission {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::speakers::ListsOfSpeakers;
    use crate::migration::test_support;
    use std::sync::Arc;

    fn user(id: i64, groups: Value) -> Value {
        json!({
            "id": id, "username": format!("user{}", id), "title": "", "first_name": "",
            "last_name": "", "is_active": true, "default_password": "pw", "gender": "",
            "email": "", "is_committee": false, "number": "", "structure_level": "",
            "vote_weight": "1.000000", "last_email_send": null, "is_present": false,
            "groups_id": groups, "vote_delegated_to_id": null, "vote_delegated_from_users_id": [],
        })
    }

    fn groups() -> Value {
        json!([
            {"id": 1, "name": "Default", "permissions": []},
            {"id": 2, "name": "Admin", "permissions": []},
            {"id": 3, "name": "Delegates", "permissions": ["users.can_change_password"]},
            {"id": 4, "name": "Guests", "permissions": ["core.can_see_frontpage"]},
        ])
    }

    #[test]
    fn test_template_fields_follow_the_emptiness_convention() {
        let mut speaking = user(1, json!([3]));
        speaking["is_present"] = json!(true);
        speaking["gender"] = json!("female");
        let store = test_support::run(
            json!({
                "users/group": groups(),
                "users/user": [speaking, user(2, json!([]))],
                "agenda/list-of-speakers": [{
                    "id": 1, "closed": false,
                    "content_object": {"collection": "topics/topic", "id": 1},
                    "speakers": [{"id": 5, "user_id": 1, "weight": 1, "marked": false,
                                  "pro_speech": null, "begin_time": null, "end_time": null}],
                }],
            }),
            vec![Arc::new(ListsOfSpeakers), Arc::new(Users)],
        )
        .unwrap();

        let speaker = store.get("user", 1).unwrap();
        assert_eq!(speaker["speaker_$_ids"], json!(["1"]));
        assert_eq!(speaker["speaker_$1_ids"], json!([5]));
        assert_eq!(speaker["group_$1_ids"], json!([3]));
        assert_eq!(speaker["is_present_in_meeting_ids"], json!([1]));
        assert_eq!(speaker["gender"], json!("female"));
        assert_eq!(speaker["can_change_own_password"], json!(true));

        let silent = store.get("user", 2).unwrap();
        assert_eq!(silent["speaker_$_ids"], json!([]));
        assert!(!silent.contains_key("speaker_$1_ids"));
        assert_eq!(silent["vote_delegated_$_to_id"], json!([]));
        assert!(!silent.contains_key("vote_delegated_$1_to_id"));
        assert_eq!(silent["gender"], Value::Null);
        assert_eq!(silent["projection_$_ids"], json!([]));
    }

    #[test]
    fn test_users_without_groups_join_the_default_group() {
        let store = test_support::run(
            json!({"users/group": groups(), "users/user": [user(1, json!([]))]}),
            vec![Arc::new(Users)],
        )
        .unwrap();
        let user = store.get("user", 1).unwrap();
        assert_eq!(user["group_$_ids"], json!(["1"]));
        assert_eq!(user["group_$1_ids"], json!([1]));
        assert_eq!(user["can_change_own_password"], json!(false));
    }

    #[test]
    fn test_change_own_password() {
        let store = test_support::run(
            json!({
                "users/group": groups(),
                "users/user": [user(1, json!([4, 2])), user(2, json!([4]))],
            }),
            vec![Arc::new(Users)],
        )
        .unwrap();
        assert_eq!(store.get("user", 1).unwrap()["can_change_own_password"], json!(true));
        assert_eq!(store.get("user", 2).unwrap()["can_change_own_password"], json!(false));
    }

    #[test]
    fn test_unknown_group_fails() {
        let result = test_support::run(
            json!({"users/group": groups(), "users/user": [user(1, json!([9]))]}),
            vec![Arc::new(Users)],
        );
        assert!(matches!(result, Err(MigrationError::MissingModel { .. })));
    }

    #[test]
    fn test_demo_users() {
        let settings = crate::config::ExportSettings {
            demo_mode_users: Some(vec![2]),
            ..Default::default()
        };
        let store = test_support::run_with(
            json!({"users/group": groups(), "users/user": [user(1, json!([1])), user(2, json!([1]))]}),
            vec![Arc::new(Users)],
            &settings,
            &os4_export_repository::MediafileBlobService::empty(),
        )
        .unwrap();
        assert_eq!(store.get("user", 1).unwrap()["is_demo_user"], json!(false));
        assert_eq!(store.get("user", 2).unwrap()["is_demo_user"], json!(true));
    }
}

use std::collections::HashMap;

use os4_export_shared::{ModelExt, TemplateField, MEETING_ID, MEETING_REPLACEMENT};
use serde_json::{json, Value};

use super::{in_meeting, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::permissions::migrate_permissions;
use crate::relations;

const COLLECTION: &str = "users/group";

const DEFAULT_GROUP_ID: i64 = 1;

const ADMIN_GROUP_ID: i64 = 2;

/// Groups. Runs after users, since `user_ids` is read from the migrated
/// users' `group_$1_ids`.
pub struct Groups;

impl Migrate for Groups {
    fn name(&self) -> &'static str {
        "groups"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let store = &ctx.store;
        let user_groups = TemplateField::new("group_$_ids").concrete(MEETING_REPLACEMENT);
        let mut reverse: Vec<(&str, HashMap<i64, Vec<i64>>)> = vec![
            ("user_ids", relations::by_member(store.iter("user"), &user_groups)),
            (
                "mediafile_access_group_ids",
                relations::by_member(store.iter("mediafile"), "access_group_ids"),
            ),
            (
                "mediafile_inherited_access_group_ids",
                relations::by_member(store.iter("mediafile"), "inherited_access_group_ids"),
            ),
            (
                "read_comment_section_ids",
                relations::by_member(store.iter("motion_comment_section"), "read_group_ids"),
            ),
            (
                "write_comment_section_ids",
                relations::by_member(store.iter("motion_comment_section"), "write_group_ids"),
            ),
            (
                "read_chat_group_ids",
                relations::by_member(store.iter("chat_group"), "read_group_ids"),
            ),
            (
                "write_chat_group_ids",
                relations::by_member(store.iter("chat_group"), "write_group_ids"),
            ),
            (
                "poll_ids",
                relations::by_member(store.iter("poll"), "entitled_group_ids"),
            ),
        ];

        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&["id", "name"]);
            let permissions = old
                .get("permissions")
                .and_then(Value::as_array)
                .map(|permissions| permissions.iter().filter_map(Value::as_str))
                .into_iter()
                .flatten();
            new.insert("permissions".into(), json!(migrate_permissions(permissions)?));

            for (name, index) in reverse.iter_mut() {
                new.insert((*name).into(), json!(relations::take(index, &id)));
            }
            new.insert(
                "default_group_for_meeting_id".into(),
                meeting_if(id == DEFAULT_GROUP_ID),
            );
            new.insert(
                "admin_group_for_meeting_id".into(),
                meeting_if(id == ADMIN_GROUP_ID),
            );
            // Set by the meeting stage.
            new.insert("used_as_motion_poll_default_id".into(), Value::Null);
            new.insert("used_as_assignment_poll_default_id".into(), Value::Null);
            new.insert("used_as_poll_default_id".into(), Value::Null);
            in_meeting(&mut new);
            ctx.store.set_model("group", new)?;
        }

        let meeting = ctx.meeting_mut()?;
        meeting.insert("default_group_id".into(), json!(DEFAULT_GROUP_ID));
        meeting.insert("admin_group_id".into(), json!(ADMIN_GROUP_ID));
        Ok(())
    }
}

fn meeting_if(condition: bool) -> Value {
    if condition {
        json!(MEETING_ID)
    } else {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support;
    use crate::migration::users::Users;
    use std::sync::Arc;

    #[test]
    fn test_permissions_are_minimized() {
        let store = test_support::run(
            json!({"users/group": [
                {"id": 3, "name": "Staff", "permissions": ["motions.can_manage", "motions.can_see"]},
            ]}),
            vec![Arc::new(Groups)],
        )
        .unwrap();
        assert_eq!(
            store.get("group", 3).unwrap()["permissions"],
            json!(["motion.can_manage"])
        );
    }

    #[test]
    fn test_group_members_and_meeting_groups() {
        let user = |id: i64, groups: Value| {
            json!({"id": id, "username": format!("u{}", id), "groups_id": groups})
        };
        let store = test_support::run(
            json!({
                "users/group": [
                    {"id": 1, "name": "Default", "permissions": []},
                    {"id": 2, "name": "Admin", "permissions": []},
                    {"id": 3, "name": "Delegates", "permissions": []},
                ],
                "users/user": [user(1, json!([2, 3])), user(2, json!([])), user(3, json!([3]))],
            }),
            vec![Arc::new(Users), Arc::new(Groups)],
        )
        .unwrap();

        let default = store.get("group", 1).unwrap();
        assert_eq!(default["user_ids"], json!([2]));
        assert_eq!(default["default_group_for_meeting_id"], json!(1));
        assert_eq!(default["admin_group_for_meeting_id"], Value::Null);
        assert_eq!(store.get("group", 2).unwrap()["admin_group_for_meeting_id"], json!(1));
        assert_eq!(store.get("group", 3).unwrap()["user_ids"], json!([1, 3]));

        let meeting = store.get("meeting", 1).unwrap();
        assert_eq!(meeting["default_group_id"], json!(1));
        assert_eq!(meeting["admin_group_id"], json!(2));
    }

    #[test]
    fn test_unknown_permission_fails() {
        let result = test_support::run(
            json!({"users/group": [{"id": 3, "name": "x", "permissions": ["core.bogus"]}]}),
            vec![Arc::new(Groups)],
        );
        assert!(matches!(result, Err(MigrationError::InvalidValue { .. })));
    }
}

use os4_export_shared::ModelExt;
use serde_json::json;

use super::{id_list, in_meeting, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;

const COLLECTION: &str = "chat/chat-group";

/// Chat groups. Messages are not exported, so `chat_message_ids` is empty.
pub struct ChatGroups;

impl Migrate for ChatGroups {
    fn name(&self) -> &'static str {
        "chat_groups"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&["id", "name"]);
            new.insert("weight".into(), json!(id));
            new.insert("read_group_ids".into(), id_list(old, "read_groups_id"));
            new.insert("write_group_ids".into(), id_list(old, "write_groups_id"));
            new.insert("chat_message_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("chat_group", new)?;
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
    fn test_chat_group() {
        let store = test_support::run(
            json!({"chat/chat-group": [
                {"id": 5, "name": "Delegates", "read_groups_id": [2, 3], "write_groups_id": [3]},
            ]}),
            vec![Arc::new(ChatGroups)],
        )
        .unwrap();

        let group = store.get("chat_group", 5).unwrap();
        assert_eq!(group["weight"], json!(5));
        assert_eq!(group["read_group_ids"], json!([2, 3]));
        assert_eq!(group["write_group_ids"], json!([3]));
        assert_eq!(group["chat_message_ids"], json!([]));
    }
}

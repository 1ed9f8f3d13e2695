use os4_export_shared::ModelExt;
use serde_json::json;
use tracing::debug;

use super::{Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::relations;

/// One-to-many lists recomputed from the forward key on the "many" side.
///
/// `(owner, list field, member collection, forward key)`.
const RELATIONS: [(&str, &str, &str, &str); 8] = [
    ("poll", "option_ids", "option", "poll_id"),
    ("option", "vote_ids", "vote", "option_id"),
    ("motion_state", "motion_ids", "motion", "state_id"),
    ("motion_state", "motion_recommendation_ids", "motion", "recommendation_id"),
    ("motion_category", "motion_ids", "motion", "category_id"),
    ("motion_block", "motion_ids", "motion", "block_id"),
    ("motion_statute_paragraph", "motion_ids", "motion", "statute_paragraph_id"),
    ("motion_comment_section", "comment_ids", "motion_comment", "section_id"),
];

/// Recompute reverse relations once all forward objects exist. Old cached
/// lists are never trusted: votes may have moved to a global option.
pub struct ReverseRelations;

impl Migrate for ReverseRelations {
    fn name(&self) -> &'static str {
        "reverse_relations"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for (owner, list, members, key) in RELATIONS {
            let mut groups = relations::by_key(ctx.store.iter(members), key);
            let mut filled = 0usize;
            for model in ctx.store.iter_mut(owner) {
                let Some(id) = model.id() else {
                    continue;
                };
                let ids = relations::take(&mut groups, &id);
                filled += ids.len();
                model.insert(list.to_string(), json!(ids));
            }
            debug!(owner, list, filled, "Recomputed reverse relation");
        }
        Ok(())
    }
}

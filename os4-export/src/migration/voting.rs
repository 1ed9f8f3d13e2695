use os4_export_shared::{Model, ModelExt, OldCollection};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use super::{
    id_list, in_meeting, label, map_enum, object, required_id, required_int, Migrate,
    MigrationContext,
};
use crate::errors::MigrationError;

const POLL_STATES: [(i64, &str); 4] = [
    (1, "created"),
    (2, "started"),
    (3, "finished"),
    (4, "published"),
];

const DEFAULT_GLOBAL_AMOUNT: &str = "0.000000";

/// Which half of the merged poll collections is being migrated.
#[derive(Debug, Clone, Copy)]
enum Family {
    Assignment,
    Motion,
}

impl Family {
    const BOTH: [Family; 2] = [Family::Assignment, Family::Motion];

    fn votes(self) -> OldCollection {
        match self {
            Family::Assignment => OldCollection::AssignmentVote,
            Family::Motion => OldCollection::MotionVote,
        }
    }

    fn options(self) -> OldCollection {
        match self {
            Family::Assignment => OldCollection::AssignmentOption,
            Family::Motion => OldCollection::MotionOption,
        }
    }

    fn polls(self) -> OldCollection {
        match self {
            Family::Assignment => OldCollection::AssignmentPoll,
            Family::Motion => OldCollection::MotionPoll,
        }
    }
}

/// Votes, options and polls of assignments and motions, merged into one
/// `vote`/`option`/`poll` family. Motion ids were already shifted by the
/// remapper, so both halves land in the same collections without clashes.
///
/// Every poll gets a synthesized global option. Votes whose value is not
/// part of their poll's method are moved onto it.
pub struct VotingSystem;

impl Migrate for VotingSystem {
    fn name(&self) -> &'static str {
        "voting_system"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        ctx.counters.option = next_option_id(ctx);

        for family in Family::BOTH {
            migrate_votes(ctx, family)?;
        }
        for family in Family::BOTH {
            migrate_options(ctx, family)?;
        }
        for family in Family::BOTH {
            migrate_polls(ctx, family)?;
        }
        move_votes_to_global_options(ctx)
    }
}

/// First id free for global options: above every remapped option id.
fn next_option_id(ctx: &MigrationContext<'_>) -> i64 {
    Family::BOTH
        .iter()
        .flat_map(|family| ctx.snapshot.collection(family.options().as_str()))
        .filter_map(|option| option.id())
        .max()
        .map_or(1, |max| max + 1)
}

fn migrate_votes(ctx: &mut MigrationContext<'_>, family: Family) -> Result<(), MigrationError> {
    for old in ctx.snapshot.collection(family.votes().as_str()) {
        let mut new = old.copy_fields(&[
            "id",
            "weight",
            "value",
            "user_token",
            "option_id",
            "user_id",
            "delegated_user_id",
        ]);
        in_meeting(&mut new);
        ctx.store.set_model("vote", new)?;
    }
    Ok(())
}

fn migrate_options(ctx: &mut MigrationContext<'_>, family: Family) -> Result<(), MigrationError> {
    let collection = family.options().as_str();
    for old in ctx.snapshot.collection(collection) {
        let mut new = old.copy_fields(&["id", "yes", "no", "abstain", "poll_id"]);
        let content_object = match family {
            Family::Assignment => ctx
                .resolver
                .resolve_known(OldCollection::User, required_int(collection, old, "user_id")?),
            Family::Motion => {
                let poll_id = required_int(collection, old, "poll_id")?;
                let poll_collection = OldCollection::MotionPoll.as_str();
                let poll = ctx
                    .snapshot
                    .get(poll_collection, poll_id)
                    .ok_or_else(|| MigrationError::missing_model(poll_collection, poll_id))?;
                ctx.resolver.resolve_known(
                    OldCollection::Motion,
                    required_int(poll_collection, poll, "motion_id")?,
                )
            }
        };
        new.insert("content_object_id".into(), content_object.into());
        new.insert("text".into(), Value::Null);
        new.insert(
            "weight".into(),
            old.get("weight").cloned().unwrap_or(json!(1)),
        );
        new.insert("used_as_global_option_in_poll_id".into(), Value::Null);
        new.insert("vote_ids".into(), json!([]));
        in_meeting(&mut new);
        ctx.store.set_model("option", new)?;
    }
    Ok(())
}

fn migrate_polls(ctx: &mut MigrationContext<'_>, family: Family) -> Result<(), MigrationError> {
    let snapshot = ctx.snapshot;
    let collection = family.polls().as_str();
    for old in snapshot.collection(collection) {
        let id = required_id(collection, old)?;
        let mut new = old.copy_fields(&[
            "id",
            "title",
            "type",
            "is_pseudoanonymized",
            "pollmethod",
            "onehundred_percent_base",
            "votesvalid",
            "votesinvalid",
            "votescast",
            "entitled_users_at_stop",
        ]);
        new.insert(
            "state".into(),
            json!(map_enum(collection, old, "state", &POLL_STATES)?),
        );
        let content_object = match family {
            Family::Assignment => ctx.resolver.resolve_known(
                OldCollection::Assignment,
                required_int(collection, old, "assignment_id")?,
            ),
            Family::Motion => ctx.resolver.resolve_known(
                OldCollection::Motion,
                required_int(collection, old, "motion_id")?,
            ),
        };
        new.insert("content_object_id".into(), content_object.into());

        // Motion polls know none of these.
        new.insert("description".into(), or_default(old, "description", json!("")));
        new.insert("min_votes_amount".into(), or_default(old, "min_votes_amount", json!(1)));
        new.insert("max_votes_amount".into(), or_default(old, "max_votes_amount", json!(1)));
        new.insert("global_yes".into(), or_default(old, "global_yes", json!(false)));
        new.insert("global_no".into(), or_default(old, "global_no", json!(false)));
        new.insert("global_abstain".into(), or_default(old, "global_abstain", json!(false)));

        new.insert("entitled_group_ids".into(), id_list(old, "groups_id"));
        new.insert("backend".into(), json!("fast"));
        new.insert("voted_ids".into(), id_list(old, "voted_id"));
        new.insert("option_ids".into(), json!([]));
        let global_option_id = create_global_option(ctx, old, id)?;
        new.insert("global_option_id".into(), json!(global_option_id));
        new.insert("projection_ids".into(), json!([]));
        in_meeting(&mut new);
        ctx.store.set_model("poll", new)?;
    }
    Ok(())
}

fn or_default(old: &Model, name: &str, default: Value) -> Value {
    old.get(name).cloned().unwrap_or(default)
}

fn create_global_option(
    ctx: &mut MigrationContext<'_>,
    poll: &Model,
    poll_id: i64,
) -> Result<i64, MigrationError> {
    let id = ctx.counters.option;
    ctx.counters.option += 1;

    let amount = |name: &str| or_default(poll, name, json!(DEFAULT_GLOBAL_AMOUNT));
    let mut option = object(json!({
        "id": id,
        "weight": 1,
        "text": null,
        "yes": amount("amount_global_yes"),
        "no": amount("amount_global_no"),
        "abstain": amount("amount_global_abstain"),
        "poll_id": null,
        "used_as_global_option_in_poll_id": poll_id,
        "vote_ids": [],
        "content_object_id": null,
    }));
    in_meeting(&mut option);
    ctx.store.set_model("option", option)?;
    Ok(id)
}

/// Redirect votes whose value is not part of the poll method, e.g. a `"Y"`
/// on a `"N"` poll, to the poll's global option.
fn move_votes_to_global_options(ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
    let mut moves = Vec::new();
    for vote in ctx.store.iter("vote") {
        let vote_id = required_id("vote", vote)?;
        let option_id = required_int("vote", vote, "option_id")?;
        let option = ctx.store.model("option", option_id)?;
        let poll_id = required_int("option", option, "poll_id")?;
        let poll = ctx.store.model("poll", poll_id)?;

        let value = vote
            .text("value")
            .ok_or_else(|| MigrationError::missing_field(label("vote", vote), "value"))?;
        let pollmethod = poll
            .text("pollmethod")
            .ok_or_else(|| MigrationError::missing_field(label("poll", poll), "pollmethod"))?;
        if !pollmethod.contains(value) {
            let global_option_id = required_int("poll", poll, "global_option_id")?;
            warn!(
                vote_id,
                poll_id,
                value,
                pollmethod,
                "Vote value is not part of the poll method, moving it to the global option"
            );
            moves.push((vote_id, global_option_id));
        }
    }

    for (vote_id, global_option_id) in moves {
        ctx.store
            .model_mut("vote", vote_id)?
            .insert("option_id".into(), json!(global_option_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support;
    use std::sync::Arc;

    fn snapshot() -> Value {
        json!({
            "assignments/assignment-poll": [{
                "id": 1, "title": "Board", "type": "named", "is_pseudoanonymized": false,
                "pollmethod": "YNA", "onehundred_percent_base": "YNA", "state": 4,
                "votesvalid": "2.000000", "votesinvalid": "0.000000", "votescast": "2.000000",
                "entitled_users_at_stop": null, "assignment_id": 3, "description": "d",
                "min_votes_amount": 1, "max_votes_amount": 2, "global_yes": true,
                "global_no": false, "global_abstain": false, "amount_global_yes": "1.000000",
                "groups_id": [2], "voted_id": [5],
            }],
            "assignments/assignment-option": [
                {"id": 1, "yes": "1.000000", "no": "0.000000", "abstain": "0.000000",
                 "poll_id": 1, "user_id": 5, "weight": 1},
            ],
            "assignments/assignment-vote": [
                {"id": 1, "weight": "1.000000", "value": "Y", "user_token": "a",
                 "option_id": 1, "user_id": 5, "delegated_user_id": null},
            ],
            "motions/motion-poll": [{
                "id": 1, "title": "Vote", "type": "analog", "is_pseudoanonymized": false,
                "pollmethod": "YN", "onehundred_percent_base": "YN", "state": 3,
                "votesvalid": null, "votesinvalid": null, "votescast": null,
                "entitled_users_at_stop": null, "motion_id": 9, "groups_id": [], "voted_id": [],
            }],
            "motions/motion-option": [
                {"id": 1, "yes": "1.000000", "no": "0.000000", "abstain": "1.000000",
                 "poll_id": 1},
            ],
            "motions/motion-vote": [
                {"id": 1, "weight": "1.000000", "value": "Y", "user_token": "b",
                 "option_id": 1, "user_id": 5, "delegated_user_id": null},
                {"id": 2, "weight": "1.000000", "value": "A", "user_token": "c",
                 "option_id": 1, "user_id": 6, "delegated_user_id": 5},
            ],
        })
    }

    #[test]
    fn test_motion_ids_follow_assignment_ids() {
        let store = test_support::run(snapshot(), vec![Arc::new(VotingSystem)]).unwrap();

        assert_eq!(store.ids("poll"), vec![1, 3]);
        let motion_poll = store.get("poll", 3).unwrap();
        assert_eq!(motion_poll["content_object_id"], json!("motion/9"));
        assert_eq!(motion_poll["state"], json!("finished"));
        assert_eq!(motion_poll["description"], json!(""));
        assert_eq!(motion_poll["max_votes_amount"], json!(1));
        assert_eq!(motion_poll["backend"], json!("fast"));

        let motion_option = store.get("option", 3).unwrap();
        assert_eq!(motion_option["poll_id"], json!(3));
        assert_eq!(motion_option["content_object_id"], json!("motion/9"));
        assert_eq!(motion_option["weight"], json!(1));

        assert_eq!(store.get("vote", 3).unwrap()["option_id"], json!(3));
    }

    #[test]
    fn test_every_poll_has_a_global_option() {
        let store = test_support::run(snapshot(), vec![Arc::new(VotingSystem)]).unwrap();

        let mut global_ids = Vec::new();
        for poll in store.iter("poll") {
            let global_id = poll["global_option_id"].as_i64().unwrap();
            let option = store.get("option", global_id).unwrap();
            assert_eq!(option["used_as_global_option_in_poll_id"], poll["id"]);
            assert_eq!(option["poll_id"], Value::Null);
            global_ids.push(global_id);
        }
        // Above the largest remapped option id (3).
        assert_eq!(global_ids, vec![4, 5]);

        let assignment_global = store.get("option", 4).unwrap();
        assert_eq!(assignment_global["yes"], json!("1.000000"));
        assert_eq!(assignment_global["no"], json!("0.000000"));
        assert_eq!(store.get("poll", 1).unwrap()["entitled_group_ids"], json!([2]));
    }

    #[test]
    fn test_vote_outside_poll_method_moves_to_global_option() {
        let store = test_support::run(snapshot(), vec![Arc::new(VotingSystem)]).unwrap();

        // "A" is not part of "YN".
        let abstention = store.get("vote", 4).unwrap();
        assert_eq!(abstention["option_id"], json!(5));
        assert_eq!(abstention["delegated_user_id"], json!(5));
        // "Y" is.
        assert_eq!(store.get("vote", 3).unwrap()["option_id"], json!(3));
        assert_eq!(store.get("vote", 1).unwrap()["option_id"], json!(1));
    }

    #[test]
    fn test_unknown_poll_state_fails() {
        let mut data = snapshot();
        data["motions/motion-poll"][0]["state"] = json!(9);
        let result = test_support::run(data, vec![Arc::new(VotingSystem)]);
        assert!(matches!(result, Err(MigrationError::InvalidValue { .. })));
    }

    #[test]
    fn test_option_counter_starts_at_one_without_options() {
        let store = test_support::run(
            json!({"motions/motion-poll": [{
                "id": 4, "title": "x", "type": "analog", "pollmethod": "YNA", "state": 1,
                "motion_id": 1, "groups_id": [], "voted_id": [],
            }]}),
            vec![Arc::new(VotingSystem)],
        )
        .unwrap();
        assert_eq!(store.ids("option"), vec![1]);
        assert_eq!(store.get("poll", 4).unwrap()["global_option_id"], json!(1));
    }
}

use os4_export_shared::{Model, ModelExt, MEETING_ID};
use serde_json::{json, Value};
use tracing::debug;

use super::{in_meeting, object, Migrate, MigrationContext};
use crate::errors::MigrationError;

const SYNTHESIZED_DESCRIPTION: &str = "created at the migration from OS3 to OS4";

const SYNTHESIZED_COUNTDOWN_SECONDS: i64 = 60;

pub struct ProjectorMessages;

impl Migrate for ProjectorMessages {
    fn name(&self) -> &'static str {
        "projector_messages"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection("core/projector-message") {
            let mut new = old.copy_fields(&["id", "message"]);
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("projector_message", new)?;
        }
        Ok(())
    }
}

/// Countdowns, plus the list of speakers countdown and the poll countdown
/// that every new meeting references.
pub struct ProjectorCountdowns;

impl Migrate for ProjectorCountdowns {
    fn name(&self) -> &'static str {
        "projector_countdowns"
    }

    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        for old in ctx.snapshot.collection("core/countdown") {
            let mut new = old.copy_fields(&[
                "id",
                "title",
                "description",
                "default_time",
                "countdown_time",
                "running",
            ]);
            new.insert("used_as_list_of_speaker_countdown_meeting_id".into(), Value::Null);
            new.insert("used_as_poll_countdown_meeting_id".into(), Value::Null);
            new.insert("projection_ids".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("projector_countdown", new)?;
        }

        let max_id = ctx.store.ids("projector_countdown").into_iter().max().unwrap_or(0);
        let list_of_speakers_id = max_id + 1;
        let poll_id = max_id + 2;
        ctx.store.set_model(
            "projector_countdown",
            synthesized_countdown(list_of_speakers_id, "list of speakers countdown", true),
        )?;
        ctx.store.set_model(
            "projector_countdown",
            synthesized_countdown(poll_id, "poll countdown", false),
        )?;
        debug!(list_of_speakers_id, poll_id, "Created meeting countdowns");

        let meeting = ctx.meeting_mut()?;
        meeting.insert("list_of_speakers_countdown_id".into(), json!(list_of_speakers_id));
        meeting.insert("poll_countdown_id".into(), json!(poll_id));
        Ok(())
    }
}

fn synthesized_countdown(id: i64, title: &str, for_list_of_speakers: bool) -> Model {
    let used_as = |flag: bool| if flag { json!(MEETING_ID) } else { Value::Null };
    let mut countdown = object(json!({
        "id": id,
        "title": title,
        "description": SYNTHESIZED_DESCRIPTION,
        "default_time": SYNTHESIZED_COUNTDOWN_SECONDS,
        "countdown_time": SYNTHESIZED_COUNTDOWN_SECONDS,
        "running": false,
        "used_as_list_of_speaker_countdown_meeting_id": used_as(for_list_of_speakers),
        "used_as_poll_countdown_meeting_id": used_as(!for_list_of_speakers),
        "projection_ids": [],
    }));
    in_meeting(&mut countdown);
    countdown
}

//! The meeting aggregator.
//!
//! Folds the old global configuration (`core/config` rows of `{key, value}`)
//! into the singleton meeting and stamps the meeting back-references onto
//! workflows, groups, mediafiles and projectors. Runs last: it lists the ids
//! of every collection the earlier stages produced.

use std::collections::HashMap;

use os4_export_shared::{is_blank, ModelExt, TemplateField, MEETING_ID};
use serde_json::{json, Value};
use tracing::{instrument, warn};

use super::{Migrate, MigrationContext};
use crate::config::defaults::{config_default, FONT_PLACES, LOGO_PLACES};
use crate::errors::MigrationError;

const CONFIG_COLLECTION: &str = "core/config";

const PROJECTION_DEFAULT_COLLECTION: &str = "core/projection-default";

const MEDIAFILE_COLLECTION: &str = "mediafiles/mediafile";

/// How a config value is carried onto its meeting field.
#[derive(Debug, Clone, Copy)]
enum Transform {
    Copy,
    /// `disable_*`/`hide_*` keys become `enable_*`/`show_*` fields.
    Negate,
    /// Numbers stored as strings.
    Int,
    /// Keep at most this many characters.
    Truncate(usize),
    /// A closed string vocabulary.
    Map(&'static [(&'static str, &'static str)]),
}

const VISIBILITIES: &[(&str, &str)] = &[("1", "common"), ("2", "internal"), ("3", "hidden")];

const SORTINGS: &[(&str, &str)] = &[("identifier", "number"), ("weight", "weight")];

/// `(meeting field, config key, transform)`.
const CONFIG_FIELDS: &[(&str, &str, Transform)] = &[
    ("welcome_title", "general_event_welcome_title", Transform::Copy),
    ("welcome_text", "general_event_welcome_text", Transform::Copy),
    ("name", "general_event_name", Transform::Copy),
    ("description", "general_event_description", Transform::Copy),
    ("location", "general_event_location", Transform::Copy),
    ("enable_anonymous", "general_system_enable_anonymous", Transform::Copy),
    ("custom_translations", "translations", Transform::Copy),
    // Conference and stream
    ("conference_show", "general_system_conference_show", Transform::Copy),
    ("conference_auto_connect", "general_system_conference_auto_connect", Transform::Copy),
    (
        "conference_los_restriction",
        "general_system_conference_los_restriction",
        Transform::Copy,
    ),
    ("conference_stream_url", "general_system_stream_url", Transform::Copy),
    ("conference_stream_poster_url", "general_system_stream_poster", Transform::Copy),
    (
        "conference_open_microphone",
        "general_system_conference_open_microphone",
        Transform::Copy,
    ),
    ("conference_open_video", "general_system_conference_open_video", Transform::Copy),
    (
        "conference_auto_connect_next_speakers",
        "general_system_conference_auto_connect_next_speakers",
        Transform::Copy,
    ),
    (
        "conference_enable_helpdesk",
        "general_system_conference_enable_helpdesk",
        Transform::Copy,
    ),
    // Applause
    ("applause_enable", "general_system_applause_enable", Transform::Copy),
    ("applause_type", "general_system_applause_type", Transform::Copy),
    ("applause_show_level", "general_system_applause_show_level", Transform::Copy),
    ("applause_min_amount", "general_system_applause_min_amount", Transform::Copy),
    ("applause_max_amount", "general_system_applause_max_amount", Transform::Copy),
    (
        "applause_particle_image_url",
        "general_system_applause_particle_image",
        Transform::Copy,
    ),
    ("applause_timeout", "general_system_stream_applause_timeout", Transform::Copy),
    // Projector
    ("projector_countdown_default_time", "projector_default_countdown", Transform::Copy),
    ("projector_countdown_warning_time", "agenda_countdown_warning_time", Transform::Copy),
    // Export
    ("export_csv_encoding", "general_csv_encoding", Transform::Copy),
    ("export_csv_separator", "general_csv_separator", Transform::Copy),
    (
        "export_pdf_pagenumber_alignment",
        "general_export_pdf_pagenumber_alignment",
        Transform::Copy,
    ),
    ("export_pdf_fontsize", "general_export_pdf_fontsize", Transform::Int),
    ("export_pdf_pagesize", "general_export_pdf_pagesize", Transform::Copy),
    // Agenda
    ("agenda_show_subtitles", "agenda_show_subtitle", Transform::Copy),
    ("agenda_enable_numbering", "agenda_enable_numbering", Transform::Copy),
    ("agenda_number_prefix", "agenda_number_prefix", Transform::Truncate(20)),
    ("agenda_numeral_system", "agenda_numeral_system", Transform::Copy),
    ("agenda_item_creation", "agenda_item_creation", Transform::Copy),
    (
        "agenda_new_items_default_visibility",
        "agenda_new_items_default_visibility",
        Transform::Map(VISIBILITIES),
    ),
    (
        "agenda_show_internal_items_on_projector",
        "agenda_hide_internal_items_on_projector",
        Transform::Negate,
    ),
    // List of speakers
    (
        "list_of_speakers_amount_last_on_projector",
        "agenda_show_last_speakers",
        Transform::Copy,
    ),
    (
        "list_of_speakers_amount_next_on_projector",
        "agenda_show_next_speakers",
        Transform::Copy,
    ),
    (
        "list_of_speakers_couple_countdown",
        "agenda_couple_countdown_and_speakers",
        Transform::Copy,
    ),
    (
        "list_of_speakers_show_amount_of_speakers_on_slide",
        "agenda_hide_amount_of_speakers",
        Transform::Negate,
    ),
    (
        "list_of_speakers_present_users_only",
        "agenda_present_speakers_only",
        Transform::Copy,
    ),
    (
        "list_of_speakers_show_first_contribution",
        "agenda_show_first_contribution",
        Transform::Copy,
    ),
    (
        "list_of_speakers_enable_point_of_order_speakers",
        "agenda_enable_point_of_order_speakers",
        Transform::Copy,
    ),
    (
        "list_of_speakers_enable_pro_contra_speech",
        "agenda_list_of_speakers_enable_pro_contra_speech",
        Transform::Copy,
    ),
    (
        "list_of_speakers_can_set_contribution_self",
        "agenda_list_of_speakers_can_set_mark_self",
        Transform::Copy,
    ),
    (
        "list_of_speakers_speaker_note_for_everyone",
        "agenda_list_of_speakers_speaker_note_for_everyone",
        Transform::Copy,
    ),
    (
        "list_of_speakers_initially_closed",
        "agenda_list_of_speakers_initially_closed",
        Transform::Copy,
    ),
    // Motions
    ("motions_preamble", "motions_preamble", Transform::Copy),
    ("motions_default_line_numbering", "motions_default_line_numbering", Transform::Copy),
    ("motions_line_length", "motions_line_length", Transform::Copy),
    ("motions_reason_required", "motions_reason_required", Transform::Copy),
    (
        "motions_enable_text_on_projector",
        "motions_disable_text_on_projector",
        Transform::Negate,
    ),
    (
        "motions_enable_reason_on_projector",
        "motions_disable_reason_on_projector",
        Transform::Negate,
    ),
    (
        "motions_enable_sidebox_on_projector",
        "motions_disable_sidebox_on_projector",
        Transform::Negate,
    ),
    (
        "motions_enable_recommendation_on_projector",
        "motions_disable_recommendation_on_projector",
        Transform::Negate,
    ),
    (
        "motions_show_referring_motions",
        "motions_hide_referring_motions",
        Transform::Negate,
    ),
    ("motions_show_sequential_number", "motions_show_sequential_numbers", Transform::Copy),
    ("motions_recommendations_by", "motions_recommendations_by", Transform::Copy),
    (
        "motions_statute_recommendations_by",
        "motions_statute_recommendations_by",
        Transform::Copy,
    ),
    (
        "motions_recommendation_text_mode",
        "motions_recommendation_text_mode",
        Transform::Copy,
    ),
    ("motions_default_sorting", "motions_motions_sorting", Transform::Map(SORTINGS)),
    ("motions_number_type", "motions_identifier", Transform::Copy),
    ("motions_number_min_digits", "motions_identifier_min_digits", Transform::Copy),
    ("motions_number_with_blank", "motions_identifier_with_blank", Transform::Copy),
    ("motions_statutes_enabled", "motions_statutes_enabled", Transform::Copy),
    ("motions_amendments_enabled", "motions_amendments_enabled", Transform::Copy),
    ("motions_amendments_in_main_list", "motions_amendments_main_table", Transform::Copy),
    (
        "motions_amendments_of_amendments",
        "motions_amendments_of_amendments",
        Transform::Copy,
    ),
    ("motions_amendments_prefix", "motions_amendments_prefix", Transform::Copy),
    ("motions_amendments_text_mode", "motions_amendments_text_mode", Transform::Copy),
    (
        "motions_amendments_multiple_paragraphs",
        "motions_amendments_multiple_paragraphs",
        Transform::Copy,
    ),
    ("motions_supporters_min_amount", "motions_min_supporters", Transform::Copy),
    ("motions_export_title", "motions_export_title", Transform::Copy),
    ("motions_export_preamble", "motions_export_preamble", Transform::Copy),
    (
        "motions_export_submitter_recommendation",
        "motions_export_submitter_recommendation",
        Transform::Copy,
    ),
    (
        "motions_export_follow_recommendation",
        "motions_export_follow_recommendation",
        Transform::Copy,
    ),
    (
        "motion_poll_ballot_paper_selection",
        "motions_pdf_ballot_papers_selection",
        Transform::Copy,
    ),
    (
        "motion_poll_ballot_paper_number",
        "motions_pdf_ballot_papers_number",
        Transform::Copy,
    ),
    ("motion_poll_default_type", "motion_poll_default_type", Transform::Copy),
    (
        "motion_poll_default_100_percent_base",
        "motion_poll_default_100_percent_base",
        Transform::Copy,
    ),
    // Users
    ("users_sort_by", "users_sort_by", Transform::Copy),
    ("users_enable_presence_view", "users_enable_presence_view", Transform::Copy),
    ("users_enable_vote_weight", "users_activate_vote_weight", Transform::Copy),
    ("users_allow_self_set_present", "users_allow_self_set_present", Transform::Copy),
    ("users_pdf_welcometitle", "users_pdf_welcometitle", Transform::Copy),
    ("users_pdf_welcometext", "users_pdf_welcometext", Transform::Copy),
    ("users_pdf_url", "users_pdf_url", Transform::Copy),
    ("users_pdf_wlan_ssid", "users_pdf_wlan_ssid", Transform::Copy),
    ("users_pdf_wlan_password", "users_pdf_wlan_password", Transform::Copy),
    ("users_pdf_wlan_encryption", "users_pdf_wlan_encryption", Transform::Copy),
    ("users_email_sender", "users_email_sender", Transform::Copy),
    ("users_email_replyto", "users_email_replyto", Transform::Copy),
    ("users_email_subject", "users_email_subject", Transform::Copy),
    ("users_email_body", "users_email_body", Transform::Copy),
    // Assignments
    ("assignments_export_title", "assignments_pdf_title", Transform::Copy),
    ("assignments_export_preamble", "assignments_pdf_preamble", Transform::Copy),
    (
        "assignment_poll_ballot_paper_selection",
        "assignments_pdf_ballot_papers_selection",
        Transform::Copy,
    ),
    (
        "assignment_poll_ballot_paper_number",
        "assignments_pdf_ballot_papers_number",
        Transform::Copy,
    ),
    (
        "assignment_poll_add_candidates_to_list_of_speakers",
        "assignment_poll_add_candidates_to_list_of_speakers",
        Transform::Copy,
    ),
    (
        "assignment_poll_sort_poll_result_by_votes",
        "assignment_poll_sort_poll_result_by_votes",
        Transform::Copy,
    ),
    ("assignment_poll_default_type", "assignment_poll_default_type", Transform::Copy),
    ("assignment_poll_default_method", "assignment_poll_method", Transform::Copy),
    (
        "assignment_poll_default_100_percent_base",
        "assignment_poll_default_100_percent_base",
        Transform::Copy,
    ),
];

/// `(config key, meeting field, workflow back-reference)`.
const WORKFLOWS: [(&str, &str, &str); 3] = [
    (
        "motions_workflow",
        "motions_default_workflow_id",
        "default_workflow_meeting_id",
    ),
    (
        "motions_amendments_workflow",
        "motions_default_amendment_workflow_id",
        "default_amendment_workflow_meeting_id",
    ),
    (
        "motions_statute_amendments_workflow",
        "motions_default_statute_amendment_workflow_id",
        "default_statute_amendment_workflow_meeting_id",
    ),
];

/// `(config key, meeting field, group back-reference)`.
const POLL_DEFAULT_GROUPS: [(&str, &str, &str); 2] = [
    (
        "motion_poll_default_groups",
        "motion_poll_default_group_ids",
        "used_as_motion_poll_default_id",
    ),
    (
        "assignment_poll_default_groups",
        "assignment_poll_default_group_ids",
        "used_as_assignment_poll_default_id",
    ),
];

/// Collections whose ids are listed on the meeting as `<collection>_ids`.
const MEETING_COLLECTIONS: [&str; 28] = [
    "projector",
    "projector_message",
    "projector_countdown",
    "tag",
    "agenda_item",
    "list_of_speakers",
    "speaker",
    "topic",
    "group",
    "mediafile",
    "motion",
    "motion_comment_section",
    "motion_category",
    "motion_block",
    "motion_workflow",
    "motion_statute_paragraph",
    "motion_comment",
    "motion_submitter",
    "motion_change_recommendation",
    "motion_state",
    "poll",
    "option",
    "vote",
    "assignment",
    "assignment_candidate",
    "personal_note",
    "chat_group",
    "chat_message",
];

/// Old projection default names and their new replacements.
const PROJECTION_DEFAULTS: [(&str, &str); 14] = [
    ("agenda_all_items", "agenda_all_items"),
    ("topics", "topics"),
    ("agenda_list_of_speakers", "list_of_speakers"),
    ("agenda_current_list_of_speakers", "current_list_of_speakers"),
    ("motions", "motion"),
    ("amendments", "amendment"),
    ("motionBlocks", "motion_block"),
    ("assignments", "assignment"),
    ("users", "user"),
    ("mediafiles", "mediafile"),
    ("messages", "projector_message"),
    ("countdowns", "projector_countdowns"),
    ("assignment_poll", "assignment_poll"),
    ("motion_poll", "motion_poll"),
];

const POLL_PROJECTION_DEFAULT: &str = "poll";

/// A kind of uploadable meeting asset.
struct Asset {
    /// Config key listing the places.
    available: &'static str,
    places: &'static [&'static str],
    /// Place names start with this prefix.
    prefix: &'static str,
    meeting_field: &'static str,
    mediafile_field: &'static str,
}

const ASSETS: [Asset; 2] = [
    Asset {
        available: "logos_available",
        places: &LOGO_PLACES,
        prefix: "logo_",
        meeting_field: "logo_$_id",
        mediafile_field: "used_as_logo_$_in_meeting_id",
    },
    Asset {
        available: "fonts_available",
        places: &FONT_PLACES,
        prefix: "font_",
        meeting_field: "font_$_id",
        mediafile_field: "used_as_font_$_in_meeting_id",
    },
];

/// Every config key the meeting stage reads.
pub fn consumed_config_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = CONFIG_FIELDS.iter().map(|(_, key, _)| *key).collect();
    keys.extend(WORKFLOWS.iter().map(|(key, _, _)| *key));
    keys.extend(POLL_DEFAULT_GROUPS.iter().map(|(key, _, _)| *key));
    for asset in &ASSETS {
        keys.push(asset.available);
        keys.extend(asset.places.iter().copied());
    }
    keys
}

/// The old config rows by key, falling back to the default table.
struct ConfigValues<'a> {
    values: HashMap<&'a str, &'a Value>,
}

impl<'a> ConfigValues<'a> {
    fn new(rows: &'a [os4_export_shared::Model]) -> Self {
        let values = rows
            .iter()
            .filter_map(|row| Some((row.text("key")?, row.get("value")?)))
            .collect();
        Self { values }
    }

    fn get(&self, key: &str) -> Result<Value, MigrationError> {
        if let Some(value) = self.values.get(key) {
            return Ok((*value).clone());
        }
        let value = config_default(key)
            .ok_or_else(|| MigrationError::missing_field(CONFIG_COLLECTION, key))?;
        warn!(key, "Config key missing from the snapshot, using the default");
        Ok(value)
    }

    fn transformed(&self, key: &str, transform: Transform) -> Result<Value, MigrationError> {
        let value = self.get(key)?;
        let invalid = || MigrationError::invalid_value(CONFIG_COLLECTION, key, &value);
        let transformed = match transform {
            Transform::Copy => value.clone(),
            Transform::Negate => json!(is_blank(&value)),
            Transform::Int => match &value {
                Value::Number(_) => value.clone(),
                Value::String(raw) => json!(raw.trim().parse::<i64>().map_err(|_| invalid())?),
                _ => return Err(invalid()),
            },
            Transform::Truncate(limit) => match &value {
                Value::String(text) => json!(text.chars().take(limit).collect::<String>()),
                _ => value.clone(),
            },
            Transform::Map(table) => {
                let raw = match &value {
                    Value::String(raw) => raw.clone(),
                    Value::Number(number) => number.to_string(),
                    _ => return Err(invalid()),
                };
                let mapped = table
                    .iter()
                    .find(|(old, _)| *old == raw)
                    .map(|(_, new)| *new)
                    .ok_or_else(invalid)?;
                json!(mapped)
            }
        };
        Ok(transformed)
    }
}

/// A config value holding an id, stored either as a number or a string.
fn config_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

pub struct Meeting;

impl Migrate for Meeting {
    fn name(&self) -> &'static str {
        "meeting"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let snapshot = ctx.snapshot;
        let configs = ConfigValues::new(snapshot.collection(CONFIG_COLLECTION));

        let mut fields = Vec::with_capacity(CONFIG_FIELDS.len() + 64);
        for &(field, key, transform) in CONFIG_FIELDS {
            fields.push((field.to_string(), configs.transformed(key, transform)?));
        }

        let settings = ctx.settings;
        fields.extend([
            ("start_time".to_string(), json!(0)),
            ("end_time".to_string(), json!(0)),
            ("jitsi_domain".to_string(), json!(settings.jitsi_domain)),
            ("jitsi_room_name".to_string(), json!(settings.jitsi_room_name)),
            ("jitsi_room_password".to_string(), json!(settings.jitsi_room_password)),
            ("enable_chat".to_string(), json!(settings.enable_chat)),
            ("imported_at".to_string(), Value::Null),
            ("url_name".to_string(), Value::Null),
            ("template_for_committee_id".to_string(), Value::Null),
            ("motion_poll_default_backend".to_string(), json!("fast")),
            ("assignment_poll_default_backend".to_string(), json!("fast")),
            ("poll_ballot_paper_selection".to_string(), json!("CUSTOM_NUMBER")),
            ("poll_ballot_paper_number".to_string(), json!(8)),
            ("poll_sort_poll_result_by_votes".to_string(), json!(true)),
            ("poll_default_type".to_string(), json!("analog")),
            ("poll_default_method".to_string(), json!("Y")),
            ("poll_default_100_percent_base".to_string(), json!("YNA")),
            ("poll_default_backend".to_string(), json!("fast")),
            ("poll_default_group_ids".to_string(), json!([])),
            ("poll_couple_countdown".to_string(), json!(true)),
        ]);

        for (key, field, backref) in WORKFLOWS {
            let value = configs.get(key)?;
            let workflow_id = config_id(&value).filter(|id| {
                let exists = ctx.store.exists("motion_workflow", *id);
                if !exists {
                    warn!(key, workflow_id = *id, "Default workflow does not exist");
                }
                exists
            });
            if let Some(id) = workflow_id {
                ctx.store
                    .model_mut("motion_workflow", id)?
                    .insert(backref.into(), json!(MEETING_ID));
            }
            fields.push((field.to_string(), json!(workflow_id)));
        }

        for (key, field, backref) in POLL_DEFAULT_GROUPS {
            let value = configs.get(key)?;
            let mut group_ids = Vec::new();
            for group_id in value.as_array().into_iter().flatten().filter_map(config_id) {
                match ctx.store.get_mut("group", group_id) {
                    Some(group) => {
                        group.insert(backref.into(), json!(MEETING_ID));
                        group_ids.push(group_id);
                    }
                    None => warn!(key, group_id, "Poll default group does not exist"),
                }
            }
            fields.push((field.to_string(), json!(group_ids)));
        }

        for collection in MEETING_COLLECTIONS {
            fields.push((format!("{}_ids", collection), json!(ctx.store.ids(collection))));
        }
        fields.push(("all_projection_ids".to_string(), json!(ctx.store.ids("projection"))));

        fields.extend([
            ("committee_id".to_string(), Value::Null),
            ("default_meeting_for_committee_id".to_string(), Value::Null),
            ("is_active_in_organization_id".to_string(), Value::Null),
            ("organization_tag_ids".to_string(), json!([])),
        ]);
        let present_user_ids: Vec<i64> = ctx
            .store
            .iter("user")
            .filter(|user| user.ids("is_present_in_meeting_ids").contains(&MEETING_ID))
            .filter_map(|user| user.id())
            .collect();
        fields.push(("present_user_ids".to_string(), json!(present_user_ids)));
        fields.push(("user_ids".to_string(), json!(ctx.store.ids("user"))));

        let meeting = ctx.meeting_mut()?;
        for (field, value) in fields {
            meeting.insert(field, value);
        }

        for asset in &ASSETS {
            migrate_assets(ctx, &configs, asset)?;
        }
        migrate_projection_defaults(ctx)?;
        Ok(())
    }
}

/// Resolve the configured logo or font places to exported mediafiles.
fn migrate_assets(
    ctx: &mut MigrationContext<'_>,
    configs: &ConfigValues<'_>,
    asset: &Asset,
) -> Result<(), MigrationError> {
    let meeting_field = TemplateField::new(asset.meeting_field);
    let mediafile_field = TemplateField::new(asset.mediafile_field);
    meeting_field.init(ctx.meeting_mut()?);

    let available = configs.get(asset.available)?;
    for place in available.as_array().into_iter().flatten().filter_map(Value::as_str) {
        let path = configs.get(place)?;
        let Some(path) = path.get("path").and_then(Value::as_str).filter(|p| !p.is_empty())
        else {
            continue;
        };
        let Some(mediafile_id) = ctx
            .snapshot
            .collection(MEDIAFILE_COLLECTION)
            .iter()
            .find(|m| {
                let prefix = m.text("media_url_prefix").unwrap_or_default();
                let own = m.text("path").unwrap_or_default();
                format!("{}{}", prefix, own) == path
            })
            .and_then(|m| m.id())
        else {
            warn!(place, path, "No mediafile matches the configured path");
            continue;
        };

        let replacement = place.strip_prefix(asset.prefix).unwrap_or(place);
        let Some(mediafile) = ctx.store.get_mut("mediafile", mediafile_id) else {
            warn!(place, mediafile_id, "Configured mediafile was not exported");
            continue;
        };
        mediafile_field.add(mediafile, replacement, json!(MEETING_ID));
        meeting_field.add(ctx.meeting_mut()?, replacement, json!(mediafile_id));
    }
    Ok(())
}

/// Map the old projection defaults onto `default_projector_$_id` and add the
/// `poll` default on the first projector.
fn migrate_projection_defaults(ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
    let meeting_field = TemplateField::new("default_projector_$_id");
    let projector_field = TemplateField::new("used_as_default_$_in_meeting_id");
    meeting_field.init(ctx.meeting_mut()?);

    let snapshot = ctx.snapshot;
    let mut defaults = Vec::new();
    for old in snapshot.collection(PROJECTION_DEFAULT_COLLECTION) {
        let name = old.text("name").unwrap_or_default();
        let replacement = PROJECTION_DEFAULTS
            .iter()
            .find(|(old_name, _)| *old_name == name)
            .map(|(_, new_name)| *new_name)
            .ok_or_else(|| {
                MigrationError::invalid_value(PROJECTION_DEFAULT_COLLECTION, "name", name)
            })?;
        let projector_id = super::required_int(PROJECTION_DEFAULT_COLLECTION, old, "projector_id")?;
        defaults.push((replacement, projector_id));
    }
    match ctx.store.ids("projector").first() {
        Some(&first) => defaults.push((POLL_PROJECTION_DEFAULT, first)),
        None => warn!("No projector to use as the poll default"),
    }

    for (replacement, projector_id) in defaults {
        let Some(projector) = ctx.store.get_mut("projector", projector_id) else {
            warn!(replacement, projector_id, "Default projector does not exist");
            continue;
        };
        projector_field.add(projector, replacement, json!(MEETING_ID));
        meeting_field.add(ctx.meeting_mut()?, replacement, json!(projector_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::groups::Groups;
    use crate::migration::mediafiles::Mediafiles;
    use crate::migration::motion_states::{MotionStates, MotionWorkflows};
    use crate::migration::projectors::Projectors;
    use crate::migration::test_support;
    use crate::store::OutputStore;
    use std::sync::Arc;

    fn config(key: &str, value: Value) -> Value {
        json!({"id": 1, "key": key, "value": value})
    }

    fn run_meeting(value: Value) -> Result<OutputStore, MigrationError> {
        test_support::run(value, vec![Arc::new(Meeting)])
    }

    #[test]
    fn test_every_consumed_key_has_a_default() {
        for key in consumed_config_keys() {
            assert!(config_default(key).is_some(), "no default for {}", key);
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let store = run_meeting(json!({})).unwrap();
        let meeting = store.get("meeting", 1).unwrap();
        assert_eq!(meeting["name"], json!("OpenSlides"));
        assert_eq!(meeting["agenda_new_items_default_visibility"], json!("internal"));
        assert_eq!(meeting["agenda_show_internal_items_on_projector"], json!(false));
        assert_eq!(meeting["motions_enable_sidebox_on_projector"], json!(false));
        assert_eq!(meeting["motions_default_sorting"], json!("number"));
        assert_eq!(meeting["export_pdf_fontsize"], json!(10));
        assert_eq!(meeting["poll_default_method"], json!("Y"));
        assert_eq!(meeting["motions_default_workflow_id"], Value::Null);
        assert_eq!(meeting["logo_$_id"], json!([]));
        assert_eq!(meeting["default_projector_$_id"], json!([]));
        assert_eq!(meeting["user_ids"], json!([]));
        assert_eq!(meeting["projection_ids"], json!([]));
    }

    #[test]
    fn test_config_values_are_transformed() {
        let store = run_meeting(json!({"core/config": [
            config("general_event_name", json!("Assembly")),
            config("agenda_number_prefix", json!("A very long agenda prefix")),
            config("agenda_new_items_default_visibility", json!("3")),
            config("motions_disable_text_on_projector", json!(true)),
            config("motions_motions_sorting", json!("weight")),
            config("general_export_pdf_fontsize", json!("12")),
        ]}))
        .unwrap();
        let meeting = store.get("meeting", 1).unwrap();
        assert_eq!(meeting["name"], json!("Assembly"));
        assert_eq!(meeting["agenda_number_prefix"], json!("A very long agenda p"));
        assert_eq!(meeting["agenda_new_items_default_visibility"], json!("hidden"));
        assert_eq!(meeting["motions_enable_text_on_projector"], json!(false));
        assert_eq!(meeting["motions_default_sorting"], json!("weight"));
        assert_eq!(meeting["export_pdf_fontsize"], json!(12));
    }

    #[test]
    fn test_unknown_visibility_fails() {
        let result = run_meeting(json!({"core/config": [
            config("agenda_new_items_default_visibility", json!("9")),
        ]}));
        assert!(matches!(result, Err(MigrationError::InvalidValue { .. })));
    }

    #[test]
    fn test_settings_are_copied() {
        let settings = crate::config::ExportSettings {
            jitsi_domain: Some("meet.example.org".into()),
            enable_chat: true,
            ..Default::default()
        };
        let store = test_support::run_with(
            json!({}),
            vec![Arc::new(Meeting)],
            &settings,
            &os4_export_repository::MediafileBlobService::empty(),
        )
        .unwrap();
        let meeting = store.get("meeting", 1).unwrap();
        assert_eq!(meeting["jitsi_domain"], json!("meet.example.org"));
        assert_eq!(meeting["jitsi_room_name"], Value::Null);
        assert_eq!(meeting["enable_chat"], json!(true));
    }

    #[test]
    fn test_back_references() {
        let store = test_support::run(
            json!({
                "core/config": [
                    config("motions_workflow", json!("1")),
                    config("motions_amendments_workflow", json!(1)),
                    config("motions_statute_amendments_workflow", json!("7")),
                    config("motion_poll_default_groups", json!([2, 9])),
                    config("logo_web_header", json!({"path": "/media/logo.png"})),
                    config("font_bold", json!({"path": "/media/missing.ttf"})),
                ],
                "motions/state": [{
                    "id": 1, "name": "submitted", "css_class": "lightblue", "restriction": [],
                    "workflow_id": 1, "next_states_id": [], "merge_amendment_into_final": 0,
                }],
                "motions/workflow": [{"id": 1, "name": "Simple", "states_id": [1], "first_state_id": 1}],
                "users/group": [
                    {"id": 1, "name": "Default", "permissions": []},
                    {"id": 2, "name": "Admin", "permissions": []},
                ],
                "mediafiles/mediafile": [{
                    "id": 3, "title": "logo.png", "is_directory": false, "parent_id": null,
                    "media_url_prefix": "/media/", "path": "logo.png",
                    "access_groups_id": [], "inherited_access_groups_id": true,
                }],
                "core/projector": [{"id": 1, "name": "Main", "reference_projector_id": 1,
                    "elements": [], "elements_preview": [], "elements_history": []}],
                "core/projection-default": [
                    {"id": 1, "name": "motions", "display_name": "Motions", "projector_id": 1},
                    {"id": 2, "name": "topics", "display_name": "Topics", "projector_id": 4},
                ],
            }),
            vec![
                Arc::new(Mediafiles),
                Arc::new(MotionStates),
                Arc::new(MotionWorkflows),
                Arc::new(Groups),
                Arc::new(Projectors),
                Arc::new(Meeting),
            ],
        )
        .unwrap();

        let meeting = store.get("meeting", 1).unwrap();
        let workflow = store.get("motion_workflow", 1).unwrap();
        assert_eq!(meeting["motions_default_workflow_id"], json!(1));
        assert_eq!(meeting["motions_default_amendment_workflow_id"], json!(1));
        assert_eq!(meeting["motions_default_statute_amendment_workflow_id"], Value::Null);
        assert_eq!(workflow["default_workflow_meeting_id"], json!(1));
        assert_eq!(workflow["default_statute_amendment_workflow_meeting_id"], Value::Null);

        assert_eq!(meeting["motion_poll_default_group_ids"], json!([2]));
        assert_eq!(store.get("group", 2).unwrap()["used_as_motion_poll_default_id"], json!(1));

        assert_eq!(meeting["logo_$_id"], json!(["web_header"]));
        assert_eq!(meeting["logo_$web_header_id"], json!(3));
        assert_eq!(meeting["font_$_id"], json!([]));
        let mediafile = store.get("mediafile", 3).unwrap();
        assert_eq!(mediafile["used_as_logo_$_in_meeting_id"], json!(["web_header"]));
        assert_eq!(mediafile["used_as_logo_$web_header_in_meeting_id"], json!(1));

        assert_eq!(meeting["default_projector_$_id"], json!(["motion", "poll"]));
        assert_eq!(meeting["default_projector_$motion_id"], json!(1));
        assert_eq!(meeting["default_projector_$poll_id"], json!(1));
        let projector = store.get("projector", 1).unwrap();
        assert_eq!(projector["used_as_default_$_in_meeting_id"], json!(["motion", "poll"]));
        assert_eq!(projector["used_as_default_$poll_in_meeting_id"], json!(1));

        assert_eq!(meeting["projector_ids"], json!([1]));
        assert_eq!(meeting["group_ids"], json!([1, 2]));
        assert_eq!(meeting["motion_state_ids"], json!([1]));
    }

    #[test]
    fn test_unknown_projection_default_fails() {
        let result = run_meeting(json!({"core/projection-default": [
            {"id": 1, "name": "weather", "projector_id": 1},
        ]}));
        assert!(matches!(result, Err(MigrationError::InvalidValue { .. })));
    }
}

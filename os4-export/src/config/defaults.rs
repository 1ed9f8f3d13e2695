//! Defaults for the old global configuration.
//!
//! Snapshots only contain config rows that were written at least once, so any
//! key the meeting aggregator reads may be absent. The values below are the
//! defaults the old server used for those keys.

use serde_json::{json, Value};

/// The places a logo can be uploaded to.
pub const LOGO_PLACES: [&str; 8] = [
    "logo_projector_main",
    "logo_projector_header",
    "logo_web_header",
    "logo_pdf_header_L",
    "logo_pdf_header_R",
    "logo_pdf_footer_L",
    "logo_pdf_footer_R",
    "logo_pdf_ballot_paper",
];

/// The places a font can be uploaded to.
pub const FONT_PLACES: [&str; 5] = [
    "font_regular",
    "font_italic",
    "font_bold",
    "font_bold_italic",
    "font_monospace",
];

const USERS_EMAIL_BODY: &str = "Dear {name},\n\nthis is your personal OpenSlides login:\n\n{url}\nUsername: {username}\nPassword: {password}\n\n\nThis email was generated automatically.";

/// The default for a config key, or `None` for keys this table does not know.
pub fn config_default(key: &str) -> Option<Value> {
    let value = match key {
        // General
        "general_event_name" => json!("OpenSlides"),
        "general_event_description" => json!("Presentation and assembly system"),
        "general_event_location" => json!(""),
        "general_event_welcome_title" => json!("Welcome to OpenSlides"),
        "general_event_welcome_text" => json!("[Space for your welcome text.]"),
        "general_system_enable_anonymous" => json!(false),
        "general_csv_separator" => json!(","),
        "general_csv_encoding" => json!("utf-8"),
        "general_export_pdf_pagenumber_alignment" => json!("center"),
        "general_export_pdf_fontsize" => json!("10"),
        "general_export_pdf_pagesize" => json!("A4"),
        "translations" => json!([]),

        // Conference and stream
        "general_system_conference_show" => json!(false),
        "general_system_conference_los_restriction" => json!(false),
        "general_system_conference_auto_connect" => json!(false),
        "general_system_conference_open_microphone" => json!(false),
        "general_system_conference_open_video" => json!(false),
        "general_system_conference_auto_connect_next_speakers" => json!(0),
        "general_system_conference_enable_helpdesk" => json!(false),
        "general_system_stream_url" => json!(""),
        "general_system_stream_poster" => json!(""),

        // Applause
        "general_system_applause_enable" => json!(false),
        "general_system_applause_type" => json!("applause-type-bar"),
        "general_system_applause_show_level" => json!(false),
        "general_system_applause_min_amount" => json!(1),
        "general_system_applause_max_amount" => json!(0),
        "general_system_applause_particle_image" => json!(""),
        "general_system_stream_applause_timeout" => json!(5),

        // Agenda and list of speakers
        "agenda_show_subtitle" => json!(false),
        "agenda_enable_numbering" => json!(true),
        "agenda_number_prefix" => json!(""),
        "agenda_numeral_system" => json!("arabic"),
        "agenda_item_creation" => json!("default_yes"),
        "agenda_new_items_default_visibility" => json!("2"),
        "agenda_hide_internal_items_on_projector" => json!(true),
        "agenda_show_last_speakers" => json!(0),
        "agenda_show_next_speakers" => json!(-1),
        "agenda_countdown_warning_time" => json!(0),
        "projector_default_countdown" => json!(60),
        "agenda_couple_countdown_and_speakers" => json!(true),
        "agenda_enable_point_of_order_speakers" => json!(false),
        "agenda_hide_amount_of_speakers" => json!(false),
        "agenda_present_speakers_only" => json!(false),
        "agenda_show_first_contribution" => json!(false),
        "agenda_list_of_speakers_enable_pro_contra_speech" => json!(false),
        "agenda_list_of_speakers_can_set_mark_self" => json!(false),
        "agenda_list_of_speakers_speaker_note_for_everyone" => json!(false),
        "agenda_list_of_speakers_initially_closed" => json!(false),

        // Motions
        "motions_workflow" => json!("1"),
        "motions_amendments_workflow" => json!("1"),
        "motions_statute_amendments_workflow" => json!("1"),
        "motions_preamble" => json!("The assembly may decide:"),
        "motions_default_line_numbering" => json!("outside"),
        "motions_line_length" => json!(85),
        "motions_reason_required" => json!(false),
        "motions_disable_text_on_projector" => json!(false),
        "motions_disable_reason_on_projector" => json!(false),
        "motions_disable_sidebox_on_projector" => json!(true),
        "motions_disable_recommendation_on_projector" => json!(false),
        "motions_hide_referring_motions" => json!(false),
        "motions_show_sequential_numbers" => json!(true),
        "motions_recommendations_by" => json!(""),
        "motions_statute_recommendations_by" => json!(""),
        "motions_recommendation_text_mode" => json!("diff"),
        "motions_motions_sorting" => json!("identifier"),
        "motions_identifier" => json!("per_category"),
        "motions_identifier_min_digits" => json!(1),
        "motions_identifier_with_blank" => json!(false),
        "motions_statutes_enabled" => json!(false),
        "motions_amendments_enabled" => json!(false),
        "motions_amendments_main_table" => json!(true),
        "motions_amendments_prefix" => json!("-"),
        "motions_amendments_text_mode" => json!("paragraph"),
        "motions_amendments_multiple_paragraphs" => json!(true),
        "motions_amendments_of_amendments" => json!(false),
        "motions_min_supporters" => json!(0),
        "motions_export_title" => json!("Motions"),
        "motions_export_preamble" => json!(""),
        "motions_export_submitter_recommendation" => json!(false),
        "motions_export_follow_recommendation" => json!(false),
        "motions_pdf_ballot_papers_selection" => json!("CUSTOM_NUMBER"),
        "motions_pdf_ballot_papers_number" => json!(8),
        "motion_poll_default_type" => json!("analog"),
        "motion_poll_default_100_percent_base" => json!("YNA"),
        "motion_poll_default_groups" => json!([]),

        // Users
        "users_sort_by" => json!("first_name"),
        "users_enable_presence_view" => json!(false),
        "users_activate_vote_weight" => json!(false),
        "users_allow_self_set_present" => json!(true),
        "users_pdf_welcometitle" => json!("Welcome to OpenSlides"),
        "users_pdf_welcometext" => json!("[Place for your welcome and help text.]"),
        "users_pdf_url" => json!("http://example.com:8000"),
        "users_pdf_wlan_ssid" => json!(""),
        "users_pdf_wlan_password" => json!(""),
        "users_pdf_wlan_encryption" => json!(""),
        "users_email_sender" => json!("OpenSlides"),
        "users_email_replyto" => json!(""),
        "users_email_subject" => json!("OpenSlides access data"),
        "users_email_body" => json!(USERS_EMAIL_BODY),

        // Assignments
        "assignments_pdf_title" => json!("Elections"),
        "assignments_pdf_preamble" => json!(""),
        "assignments_pdf_ballot_papers_selection" => json!("CUSTOM_NUMBER"),
        "assignments_pdf_ballot_papers_number" => json!(8),
        "assignment_poll_add_candidates_to_list_of_speakers" => json!(false),
        "assignment_poll_sort_poll_result_by_votes" => json!(true),
        "assignment_poll_default_type" => json!("analog"),
        "assignment_poll_method" => json!("votes"),
        "assignment_poll_default_100_percent_base" => json!("valid"),
        "assignment_poll_default_groups" => json!([]),

        // Logos and fonts
        "logos_available" => json!(LOGO_PLACES),
        "fonts_available" => json!(FONT_PLACES),
        place if LOGO_PLACES.contains(&place) || FONT_PLACES.contains(&place) => {
            json!({ "path": "" })
        }

        _ => return None,
    };
    Some(value)
}

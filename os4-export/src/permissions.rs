//! Group permission migration.
//!
//! Old permissions are `"app.codename"` strings. Each maps to one new
//! permission, or to nothing when the new data model has no equivalent. The
//! migrated set is then minimized: a permission implied by another one in the
//! set is dropped.

use crate::errors::MigrationError;

/// The new permission for an old one. `Ok(None)` for permissions without an
/// equivalent; unknown permissions are an error.
pub fn map_permission(old: &str) -> Result<Option<&'static str>, MigrationError> {
    let new = match old {
        "agenda.can_see" => "agenda_item.can_see",
        "agenda.can_see_internal_items" => "agenda_item.can_see_internal",
        "agenda.can_manage" => "agenda_item.can_manage",
        "assignments.can_see" => "assignment.can_see",
        "assignments.can_manage" => "assignment.can_manage",
        "assignments.can_nominate_other" => "assignment.can_nominate_other",
        "assignments.can_nominate_self" => "assignment.can_nominate_self",
        "chat.can_manage" => "chat.can_manage",
        "agenda.can_see_list_of_speakers" => "list_of_speakers.can_see",
        "agenda.can_manage_list_of_speakers" => "list_of_speakers.can_manage",
        "agenda.can_be_speaker" => "list_of_speakers.can_be_speaker",
        "mediafiles.can_see" => "mediafile.can_see",
        "mediafiles.can_manage" => "mediafile.can_manage",
        "core.can_manage_config" => "meeting.can_manage_settings",
        "core.can_manage_logos_and_fonts" => "meeting.can_manage_logos_and_fonts",
        "core.can_see_frontpage" => "meeting.can_see_frontpage",
        "core.can_see_autopilot" => "meeting.can_see_autopilot",
        "core.can_see_livestream" => "meeting.can_see_livestream",
        "core.can_see_history" => "meeting.can_see_history",
        "motions.can_see" => "motion.can_see",
        "motions.can_see_internal" => "motion.can_see_internal",
        "motions.can_manage" => "motion.can_manage",
        "motions.can_manage_metadata" => "motion.can_manage_metadata",
        "motions.can_manage_polls" => "motion.can_manage_polls",
        "motions.can_create" => "motion.can_create",
        "motions.can_create_amendments" => "motion.can_create_amendments",
        "motions.can_support" => "motion.can_support",
        "core.can_see_projector" => "projector.can_see",
        "core.can_manage_projector" => "projector.can_manage",
        "core.can_manage_tags" => "projector.can_manage",
        "users.can_see_extra_data" => "user.can_see_extra_data",
        "users.can_see_name" => "user.can_see",
        "users.can_manage" => "user.can_manage",
        "users.can_change_password" => return Ok(None),
        unknown => {
            return Err(MigrationError::invalid_value(
                "users/group",
                "permissions",
                unknown,
            ))
        }
    };
    Ok(Some(new))
}

/// The permissions implied by a new permission.
pub fn implied_permissions(permission: &str) -> &'static [&'static str] {
    match permission {
        "agenda_item.can_manage" => &["agenda_item.can_see_internal", "agenda_item.can_see"],
        "agenda_item.can_see_internal" => &["agenda_item.can_see"],
        "assignment.can_manage" => &["assignment.can_nominate_other", "assignment.can_see"],
        "assignment.can_nominate_other" => &["assignment.can_see"],
        "assignment.can_nominate_self" => &["assignment.can_see"],
        "list_of_speakers.can_manage" => &["list_of_speakers.can_see"],
        "list_of_speakers.can_be_speaker" => &["list_of_speakers.can_see"],
        "mediafile.can_manage" => &["mediafile.can_see"],
        "motion.can_manage" => &[
            "motion.can_manage_metadata",
            "motion.can_manage_polls",
            "motion.can_see_internal",
            "motion.can_create",
            "motion.can_create_amendments",
            "motion.can_see",
        ],
        "motion.can_manage_metadata" => &["motion.can_see"],
        "motion.can_manage_polls" => &["motion.can_see"],
        "motion.can_see_internal" => &["motion.can_see"],
        "motion.can_create" => &["motion.can_see"],
        "motion.can_create_amendments" => &["motion.can_see"],
        "motion.can_support" => &["motion.can_see"],
        "projector.can_manage" => &["projector.can_see"],
        "user.can_manage" => &["user.can_see_extra_data", "user.can_see"],
        "user.can_see_extra_data" => &["user.can_see"],
        _ => &[],
    }
}

/// Map and minimize a group's permissions.
///
/// The result keeps the order in which the permissions first appear.
pub fn migrate_permissions<'a>(
    old: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<&'static str>, MigrationError> {
    let mut mapped: Vec<&'static str> = Vec::new();
    for permission in old {
        if let Some(new) = map_permission(permission)? {
            if !mapped.contains(&new) {
                mapped.push(new);
            }
        }
    }

    let implied: Vec<&'static str> = mapped
        .iter()
        .flat_map(|permission| implied_permissions(permission).iter().copied())
        .collect();
    mapped.retain(|permission| !implied.contains(permission));
    Ok(mapped)
}

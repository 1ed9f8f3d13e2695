//! Projector slide kinds.

use std::str::FromStr;

use os4_export_shared::OldCollection;

use crate::errors::MigrationError;

/// What an old projector element shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    /// An object of a collection that exists in the new data model.
    Content(OldCollection),
    /// A slide without backing object. It is projected onto the meeting and
    /// tagged with this projection type.
    Meeting(&'static str),
    /// The clock. It becomes a flag on the projector instead of a projection.
    Clock,
}

impl FromStr for SlideKind {
    type Err = MigrationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if let Ok(collection) = name.parse::<OldCollection>() {
            return Ok(Self::Content(collection));
        }
        match name {
            "agenda/item-list" => Ok(Self::Meeting("agenda_item_list")),
            "agenda/current-list-of-speakers" | "agenda/current-list-of-speakers-overlay" => {
                Ok(Self::Meeting("current_list_of_speakers"))
            }
            "agenda/current-speaker-chyron" => Ok(Self::Meeting("current_speaker_chyron")),
            "core/clock" => Ok(Self::Clock),
            unknown => Err(MigrationError::UnknownSlide(unknown.to_string())),
        }
    }
}

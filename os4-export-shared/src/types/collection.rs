//! The table of old collections that can be referenced from other objects.
//!
//! Each variant knows its new collection name and whether its ids go through
//! the poll/option/vote remap. Old collections that never appear inside a
//! reference (`core/config`, `core/tag`, ...) are read by name and are not
//! part of this table.

use std::fmt;
use std::str::FromStr;

/// The merged poll/option/vote families whose motion ids are shifted by the
/// remapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollFamily {
    Poll,
    Option,
    Vote,
}

/// An old collection with a counterpart in the new data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OldCollection {
    AgendaItem,
    ListOfSpeakers,
    Assignment,
    AssignmentOption,
    AssignmentPoll,
    AssignmentVote,
    ChatGroup,
    Countdown,
    Projector,
    ProjectorMessage,
    Mediafile,
    MotionCategory,
    Motion,
    MotionBlock,
    MotionChangeRecommendation,
    MotionCommentSection,
    MotionOption,
    MotionPoll,
    MotionVote,
    MotionState,
    MotionStatuteParagraph,
    MotionWorkflow,
    Topic,
    Group,
    PersonalNote,
    User,
}

impl OldCollection {
    pub const ALL: [OldCollection; 26] = [
        Self::AgendaItem,
        Self::ListOfSpeakers,
        Self::Assignment,
        Self::AssignmentOption,
        Self::AssignmentPoll,
        Self::AssignmentVote,
        Self::ChatGroup,
        Self::Countdown,
        Self::Projector,
        Self::ProjectorMessage,
        Self::Mediafile,
        Self::MotionCategory,
        Self::Motion,
        Self::MotionBlock,
        Self::MotionChangeRecommendation,
        Self::MotionCommentSection,
        Self::MotionOption,
        Self::MotionPoll,
        Self::MotionVote,
        Self::MotionState,
        Self::MotionStatuteParagraph,
        Self::MotionWorkflow,
        Self::Topic,
        Self::Group,
        Self::PersonalNote,
        Self::User,
    ];

    /// The old collection name, e.g. `"motions/motion"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgendaItem => "agenda/item",
            Self::ListOfSpeakers => "agenda/list-of-speakers",
            Self::Assignment => "assignments/assignment",
            Self::AssignmentOption => "assignments/assignment-option",
            Self::AssignmentPoll => "assignments/assignment-poll",
            Self::AssignmentVote => "assignments/assignment-vote",
            Self::ChatGroup => "chat/chat-group",
            Self::Countdown => "core/countdown",
            Self::Projector => "core/projector",
            Self::ProjectorMessage => "core/projector-message",
            Self::Mediafile => "mediafiles/mediafile",
            Self::MotionCategory => "motions/category",
            Self::Motion => "motions/motion",
            Self::MotionBlock => "motions/motion-block",
            Self::MotionChangeRecommendation => "motions/motion-change-recommendation",
            Self::MotionCommentSection => "motions/motion-comment-section",
            Self::MotionOption => "motions/motion-option",
            Self::MotionPoll => "motions/motion-poll",
            Self::MotionVote => "motions/motion-vote",
            Self::MotionState => "motions/state",
            Self::MotionStatuteParagraph => "motions/statute-paragraph",
            Self::MotionWorkflow => "motions/workflow",
            Self::Topic => "topics/topic",
            Self::Group => "users/group",
            Self::PersonalNote => "users/personal-note",
            Self::User => "users/user",
        }
    }

    /// The collection name in the new data model.
    pub fn new_collection(&self) -> &'static str {
        match self {
            Self::AgendaItem => "agenda_item",
            Self::ListOfSpeakers => "list_of_speakers",
            Self::Assignment => "assignment",
            Self::AssignmentOption | Self::MotionOption => "option",
            Self::AssignmentPoll | Self::MotionPoll => "poll",
            Self::AssignmentVote | Self::MotionVote => "vote",
            Self::ChatGroup => "chat_group",
            Self::Countdown => "projector_countdown",
            Self::Projector => "projector",
            Self::ProjectorMessage => "projector_message",
            Self::Mediafile => "mediafile",
            Self::MotionCategory => "motion_category",
            Self::Motion => "motion",
            Self::MotionBlock => "motion_block",
            Self::MotionChangeRecommendation => "motion_change_recommendation",
            Self::MotionCommentSection => "motion_comment_section",
            Self::MotionState => "motion_state",
            Self::MotionStatuteParagraph => "motion_statute_paragraph",
            Self::MotionWorkflow => "motion_workflow",
            Self::Topic => "topic",
            Self::Group => "group",
            Self::PersonalNote => "personal_note",
            Self::User => "user",
        }
    }

    /// The remapped family for the motion half of the merged poll collections.
    ///
    /// Only the motion collections are shifted; assignment ids keep their
    /// values, so this is `None` for them.
    pub fn remapped_family(&self) -> Option<PollFamily> {
        match self {
            Self::MotionPoll => Some(PollFamily::Poll),
            Self::MotionOption => Some(PollFamily::Option),
            Self::MotionVote => Some(PollFamily::Vote),
            _ => None,
        }
    }
}

impl FromStr for OldCollection {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| name.to_string())
    }
}

impl fmt::Display for OldCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

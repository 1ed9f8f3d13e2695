//! Poll, option and vote id remapping.
//!
//! The new data model merges the assignment and motion poll families into
//! single `poll`, `option` and `vote` collections. Assignment ids are kept;
//! motion ids are shifted past the largest assignment id of the same family.

use os4_export_shared::{ModelExt, OldCollection, PollFamily};
use serde_json::Value;
use tracing::info;

use crate::snapshot::Snapshot;

/// Offsets added to the ids of the motion poll families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdOffsets {
    pub poll: i64,
    pub option: i64,
    pub vote: i64,
}

impl IdOffsets {
    /// Compute the offsets from the assignment collections: one more than
    /// the largest id, or zero when the collection is empty.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            poll: offset_for(snapshot, OldCollection::AssignmentPoll),
            option: offset_for(snapshot, OldCollection::AssignmentOption),
            vote: offset_for(snapshot, OldCollection::AssignmentVote),
        }
    }

    pub fn offset(&self, family: PollFamily) -> i64 {
        match family {
            PollFamily::Poll => self.poll,
            PollFamily::Option => self.option,
            PollFamily::Vote => self.vote,
        }
    }

    /// The id an old object gets in the new data model.
    pub fn new_id(&self, collection: OldCollection, id: i64) -> i64 {
        match collection.remapped_family() {
            Some(family) => id + self.offset(family),
            None => id,
        }
    }
}

fn offset_for(snapshot: &Snapshot, collection: OldCollection) -> i64 {
    snapshot
        .collection(collection.as_str())
        .iter()
        .filter_map(|model| model.id())
        .max()
        .map_or(0, |max| max + 1)
}

/// Shift the motion poll, option and vote ids of the snapshot in place.
///
/// Must run before anything reads those collections.
pub fn remap_motion_poll_ids(snapshot: &mut Snapshot) -> IdOffsets {
    let offsets = IdOffsets::from_snapshot(snapshot);

    shift(snapshot, OldCollection::MotionPoll, &[("id", offsets.poll)]);
    shift(
        snapshot,
        OldCollection::MotionOption,
        &[("id", offsets.option), ("poll_id", offsets.poll)],
    );
    shift(
        snapshot,
        OldCollection::MotionVote,
        &[("id", offsets.vote), ("option_id", offsets.option)],
    );
    snapshot.reindex();

    info!(
        poll_offset = offsets.poll,
        option_offset = offsets.option,
        vote_offset = offsets.vote,
        "Remapped motion poll ids"
    );
    offsets
}

fn shift(snapshot: &mut Snapshot, collection: OldCollection, fields: &[(&str, i64)]) {
    let Some(models) = snapshot.collection_mut(collection.as_str()) else {
        return;
    };
    for model in models {
        for (field, offset) in fields {
            if let Some(value) = model.int(field) {
                model.insert((*field).to_string(), Value::from(value + offset));
            }
        }
    }
}

//! Projectors and projections.
//!
//! An old projector embeds its slides as three lists of element objects:
//! `elements` (current), `elements_preview` and `elements_history` (a list
//! of lists). Every element that points at an exported object becomes a
//! `projection`. Projection ids come from one counter shared by all
//! projectors and only advance when a projection is registered.

use os4_export_shared::{Fqid, Model, ModelExt, TemplateField, MEETING_ID, MEETING_REPLACEMENT};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{in_meeting, label, required, required_id, Migrate, MigrationContext};
use crate::errors::MigrationError;
use crate::slides::SlideKind;

const COLLECTION: &str = "core/projector";

/// Element keys that describe the slide itself rather than its options.
const ELEMENT_KEYS: [&str; 3] = ["id", "name", "stable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Current,
    Preview,
    History,
}

impl Slot {
    const ALL: [Slot; 3] = [Slot::Current, Slot::Preview, Slot::History];

    fn as_str(self) -> &'static str {
        match self {
            Slot::Current => "current",
            Slot::Preview => "preview",
            Slot::History => "history",
        }
    }

    fn projector_field(self) -> String {
        format!("{}_projector_id", self.as_str())
    }

    fn projection_ids_field(self) -> String {
        format!("{}_projection_ids", self.as_str())
    }
}

pub struct Projectors;

impl Migrate for Projectors {
    fn name(&self) -> &'static str {
        "projectors"
    }

    #[instrument(skip_all)]
    fn migrate(&self, ctx: &mut MigrationContext<'_>) -> Result<(), MigrationError> {
        let snapshot = ctx.snapshot;
        for old in snapshot.collection(COLLECTION) {
            let id = required_id(COLLECTION, old)?;
            let mut new = old.copy_fields(&[
                "id",
                "name",
                "scale",
                "scroll",
                "width",
                "aspect_ratio_numerator",
                "aspect_ratio_denominator",
                "color",
                "background_color",
                "header_background_color",
                "header_font_color",
                "header_h1_color",
                "chyron_background_color",
                "chyron_font_color",
                "show_header_footer",
                "show_title",
                "show_logo",
            ]);
            new.insert("show_clock".into(), json!(false));

            for slot in Slot::ALL {
                let mut projection_ids = Vec::new();
                for (index, element) in elements(old, slot)?.into_iter().enumerate() {
                    let weight = index as i64 + 1;
                    let kind: SlideKind = required("projector element", element, "name")?
                        .as_str()
                        .unwrap_or_default()
                        .parse()?;
                    if kind == SlideKind::Clock {
                        // Only the current clock survives, as a projector flag.
                        if slot == Slot::Current {
                            new.insert("show_clock".into(), json!(true));
                        }
                        continue;
                    }
                    if let Some(projection_id) =
                        create_projection(ctx, element, kind, weight, slot, id)?
                    {
                        projection_ids.push(projection_id);
                    }
                }
                new.insert(slot.projection_ids_field(), json!(projection_ids));
            }

            if old.int("reference_projector_id") == Some(id) {
                ctx.meeting_mut()?
                    .insert("reference_projector_id".into(), json!(id));
                new.insert(
                    "used_as_reference_projector_meeting_id".into(),
                    json!(MEETING_ID),
                );
            } else {
                new.insert("used_as_reference_projector_meeting_id".into(), Value::Null);
            }
            // Filled by the meeting stage.
            new.insert("used_as_default_$_in_meeting_id".into(), json!([]));
            in_meeting(&mut new);
            ctx.store.set_model("projector", new)?;
        }
        Ok(())
    }
}

/// The elements of one slot, with the history flattened.
fn elements(projector: &Model, slot: Slot) -> Result<Vec<&Model>, MigrationError> {
    let lists: Vec<&Value> = match slot {
        Slot::Current => projector.get("elements").into_iter().collect(),
        Slot::Preview => projector.get("elements_preview").into_iter().collect(),
        Slot::History => projector
            .get("elements_history")
            .and_then(Value::as_array)
            .map(|history| history.iter().collect())
            .unwrap_or_default(),
    };

    let mut elements = Vec::new();
    for list in lists {
        let Value::Array(items) = list else {
            continue;
        };
        for item in items {
            let element = item.as_object().ok_or_else(|| {
                MigrationError::invalid_value(label(COLLECTION, projector), slot.as_str(), item)
            })?;
            elements.push(element);
        }
    }
    Ok(elements)
}

/// Create the projection for one element.
///
/// Returns `None` when the projected object was not exported; the counter is
/// left untouched in that case.
fn create_projection(
    ctx: &mut MigrationContext<'_>,
    element: &Model,
    kind: SlideKind,
    weight: i64,
    slot: Slot,
    projector_id: i64,
) -> Result<Option<i64>, MigrationError> {
    let (target, projection_type) = match kind {
        SlideKind::Content(collection) => {
            let element_id = element
                .int("id")
                .ok_or_else(|| MigrationError::missing_field(collection.as_str(), "id"))?;
            (ctx.resolver.resolve_known(collection, element_id), Value::Null)
        }
        SlideKind::Meeting(projection_type) => {
            (Fqid::new("meeting", MEETING_ID), json!(projection_type))
        }
        SlideKind::Clock => return Ok(None),
    };

    let id = ctx.counters.projection;
    let Some(content_object) = ctx.store.get_mut(&target.collection, target.id) else {
        debug!(projector_id, target = %target, "Dropping projection of a missing object");
        return Ok(None);
    };
    if target.collection == "user" {
        TemplateField::new("projection_$_ids").push(content_object, MEETING_REPLACEMENT, json!(id));
    } else {
        content_object.push_to("projection_ids", json!(id));
    }
    ctx.counters.projection += 1;

    let options: Model = element
        .iter()
        .filter(|(key, _)| !ELEMENT_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let mut projection = Model::new();
    projection.insert("id".into(), json!(id));
    projection.insert(
        "stable".into(),
        element.get("stable").cloned().unwrap_or(json!(true)),
    );
    projection.insert("weight".into(), json!(weight));
    projection.insert("options".into(), Value::Object(options));
    for other in Slot::ALL {
        let value = if other == slot { json!(projector_id) } else { Value::Null };
        projection.insert(other.projector_field(), value);
    }
    in_meeting(&mut projection);
    projection.insert("content_object_id".into(), target.into());
    projection.insert("type".into(), projection_type);
    ctx.store.set_model("projection", projection)?;
    Ok(Some(id))
}

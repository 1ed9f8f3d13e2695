//! Relation indexes.
//!
//! Reverse relations are computed with one ordered scan of the owning
//! collection instead of trusting cached lists from the old data model. The
//! helpers group the ids of `models` by a foreign key; each group keeps the
//! scan order.

use std::collections::HashMap;

use os4_export_shared::{Model, ModelExt};

/// Group ids by a scalar foreign key, e.g. option ids by `poll_id`.
pub fn by_key<'a>(models: impl IntoIterator<Item = &'a Model>, field: &str) -> HashMap<i64, Vec<i64>> {
    let mut groups: HashMap<i64, Vec<i64>> = HashMap::new();
    for model in models {
        if let (Some(id), Some(key)) = (model.id(), model.int(field)) {
            groups.entry(key).or_default().push(id);
        }
    }
    groups
}

/// Group ids by the members of a list field, e.g. motion ids by each entry
/// of `supporter_ids`. An id appears once per group even if the list repeats
/// a member.
pub fn by_member<'a>(
    models: impl IntoIterator<Item = &'a Model>,
    field: &str,
) -> HashMap<i64, Vec<i64>> {
    let mut groups: HashMap<i64, Vec<i64>> = HashMap::new();
    for model in models {
        let Some(id) = model.id() else {
            continue;
        };
        for member in model.ids(field) {
            let group = groups.entry(member).or_default();
            if group.last() != Some(&id) {
                group.push(id);
            }
        }
    }
    groups
}

/// Group ids by a string field, e.g. poll ids by `content_object_id`.
pub fn by_text<'a>(
    models: impl IntoIterator<Item = &'a Model>,
    field: &str,
) -> HashMap<String, Vec<i64>> {
    let mut groups: HashMap<String, Vec<i64>> = HashMap::new();
    for model in models {
        if let (Some(id), Some(key)) = (model.id(), model.text(field)) {
            groups.entry(key.to_string()).or_default().push(id);
        }
    }
    groups
}

/// Take one group out of an index, empty if there is none.
pub fn take<K: std::hash::Hash + Eq>(groups: &mut HashMap<K, Vec<i64>>, key: &K) -> Vec<i64> {
    groups.remove(key).unwrap_or_default()
}

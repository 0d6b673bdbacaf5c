//! Snapshot diff computation.
//!
//! [`diff_primitive`] compares flat field maps, [`diff`] adds the nested-map
//! rules for sub-items such as mesh layers, and [`diff_list`] matches whole
//! snapshots by identifier.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use crate::diff::model::{FieldChange, FieldDiff, ItemChange, ItemDiff, ListDiff};
use crate::model::{Fields, Item};

/// Elements of `a` that do not occur in `b`, in the order they appear in `a`.
pub fn set_difference<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let b: HashSet<&T> = b.iter().collect();
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}

/// True if both maps have exactly the same keys, in any order.
pub fn same_keys(a: &Fields, b: &Fields) -> bool {
    a.len() == b.len() && a.keys().all(|k| b.contains_key(k))
}

/// Compare two flat field maps key by key.
///
/// - key only in `old` => [`FieldChange::Unset`]
/// - key only in `new`, or value changed => [`FieldChange::Set`] with the new value
/// - unchanged keys are omitted
///
/// Values are compared as whole values; arrays and objects are not descended
/// into.
pub fn diff_primitive(old: &Fields, new: &Fields) -> FieldDiff {
    let mut out = FieldDiff::new();
    for key in old.keys() {
        if !new.contains_key(key) {
            out.insert(key.clone(), FieldChange::Unset);
        }
    }
    for (key, value) in new {
        if old.get(key) != Some(value) {
            out.insert(key.clone(), FieldChange::Set(value.clone()));
        }
    }
    out
}

/// Split a field map into its nested-map fields and everything else.
///
/// Object-valued fields are nested maps of sub-items keyed by sub-identifier.
/// Arrays stay with the scalars and are compared as opaque values.
fn split_nested(fields: &Fields) -> (BTreeMap<&str, &Fields>, Fields) {
    let mut nested = BTreeMap::new();
    let mut scalars = Fields::new();
    for (key, value) in fields {
        match value {
            Value::Object(map) => {
                nested.insert(key.as_str(), map);
            }
            _ => {
                scalars.insert(key.clone(), value.clone());
            }
        }
    }
    (nested, scalars)
}

/// Diff one nested map (e.g. `layers`) whose key set is already known to match.
///
/// Returns `None` when the change is irreconcilable: a sub-item changed its own
/// key set, or a sub-entry is not an object and changed value.
fn diff_nested(old: &Fields, new: &Fields) -> Option<BTreeMap<String, FieldDiff>> {
    let mut subs = BTreeMap::new();
    for (sub_key, old_sub) in old {
        let new_sub = new.get(sub_key)?;
        if old_sub == new_sub {
            continue;
        }
        match (old_sub.as_object(), new_sub.as_object()) {
            (Some(o), Some(n)) if same_keys(o, n) => {
                let d = diff_primitive(o, n);
                if !d.is_empty() {
                    subs.insert(sub_key.clone(), d);
                }
            }
            _ => return None,
        }
    }
    Some(subs)
}

/// Diff two versions of the same item.
///
/// Scalar fields are diffed with [`diff_primitive`]. For nested-map fields:
/// if the set of nested fields changed, if any nested map gained or lost a
/// sub-item, or if any sub-item gained or lost a field, the result is
/// [`ItemDiff::Irreconcilable`]; the viewer cannot patch such structural
/// changes. Otherwise only the changed fields of changed sub-items are kept.
pub fn diff(old: &Fields, new: &Fields) -> ItemDiff {
    let (old_nested, old_scalars) = split_nested(old);
    let (new_nested, new_scalars) = split_nested(new);

    if old_nested.len() != new_nested.len()
        || old_nested.keys().any(|k| !new_nested.contains_key(k))
    {
        return ItemDiff::Irreconcilable;
    }

    let mut out = FieldDiff::new();
    for (field, old_map) in &old_nested {
        let new_map = new_nested[field];
        if !same_keys(old_map, new_map) {
            return ItemDiff::Irreconcilable;
        }
        match diff_nested(old_map, new_map) {
            None => return ItemDiff::Irreconcilable,
            Some(subs) if !subs.is_empty() => {
                out.insert((*field).to_string(), FieldChange::Nested(subs));
            }
            Some(_) => {}
        }
    }

    out.extend(diff_primitive(&old_scalars, &new_scalars));

    if out.is_empty() {
        ItemDiff::NoChange
    } else {
        ItemDiff::Partial(out)
    }
}

/// Diff two snapshots, matching items by URL.
///
/// - URL only in `new` => `added`
/// - URL only in `old` => `removed`
/// - URL in both, partial diff => `changed`
/// - URL in both, irreconcilable => old copy in `removed` and new copy in `added`
///
/// `added` follows the order of `new`; `removed` and `changed` follow the
/// order of `old`. URLs are expected to be unique within a snapshot.
pub fn diff_list(old: &[Item], new: &[Item]) -> ListDiff {
    let old_urls: Vec<&str> = old.iter().map(|v| v.url.as_str()).collect();
    let new_urls: Vec<&str> = new.iter().map(|v| v.url.as_str()).collect();

    let mut added_urls: HashSet<&str> = set_difference(&new_urls, &old_urls).into_iter().collect();
    let mut removed_urls: HashSet<&str> =
        set_difference(&old_urls, &new_urls).into_iter().collect();

    let new_by_url: HashMap<&str, &Item> = new.iter().map(|v| (v.url.as_str(), v)).collect();

    let mut changed = Vec::new();
    for old_item in old {
        let Some(new_item) = new_by_url.get(old_item.url.as_str()) else {
            continue;
        };
        match diff(&old_item.fields, &new_item.fields) {
            ItemDiff::NoChange => {}
            ItemDiff::Partial(changes) => changed.push(ItemChange::new(&old_item.url, changes)),
            ItemDiff::Irreconcilable => {
                added_urls.insert(old_item.url.as_str());
                removed_urls.insert(old_item.url.as_str());
            }
        }
    }

    ListDiff {
        added: new
            .iter()
            .filter(|v| added_urls.contains(v.url.as_str()))
            .cloned()
            .collect(),
        removed: old
            .iter()
            .filter(|v| removed_urls.contains(v.url.as_str()))
            .cloned()
            .collect(),
        changed,
    }
}

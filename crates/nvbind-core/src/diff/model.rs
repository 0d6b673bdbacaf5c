//! Diff output types.
//!
//! Field diffs use `BTreeMap` so serialized output is deterministic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::model::Item;

/// Mapping from field name to its change.
pub type FieldDiff = BTreeMap<String, FieldChange>;

/// The change recorded for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChange {
    /// Field was added or its value changed; holds the new value
    Set(Value),
    /// Field was present before and is absent now
    ///
    /// Distinct from `Set(Value::Null)`: null is a real value for fields such
    /// as `modulationImageUrl`.
    Unset,
    /// Per-sub-item field diffs of a nested map whose key set did not change
    Nested(BTreeMap<String, FieldDiff>),
}

impl FieldChange {
    /// The new value, if this change assigns one
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldChange::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// Outcome of diffing one item against its previous version.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemDiff {
    /// Nothing changed
    NoChange,
    /// Some fields changed and can be patched in place
    Partial(FieldDiff),
    /// The change cannot be expressed as a patch; the item must be reloaded
    Irreconcilable,
}

impl ItemDiff {
    pub fn is_irreconcilable(&self) -> bool {
        matches!(self, ItemDiff::Irreconcilable)
    }
}

/// A partial change to an item present in both snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemChange {
    /// Identifier of the changed item
    pub url: String,
    /// Fields that changed
    pub changes: FieldDiff,
}

impl ItemChange {
    pub fn new(url: impl Into<String>, changes: FieldDiff) -> Self {
        Self {
            url: url.into(),
            changes,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }
}

/// Difference between two snapshots of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListDiff {
    /// Items to load: new identifiers, plus new copies of irreconcilable items
    pub added: Vec<Item>,
    /// Items to drop: vanished identifiers, plus old copies of irreconcilable items
    pub removed: Vec<Item>,
    /// In-place patches for items present on both sides
    pub changed: Vec<ItemChange>,
}

impl ListDiff {
    /// True when the two snapshots describe the same state
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

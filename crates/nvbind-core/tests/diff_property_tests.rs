#![allow(clippy::unwrap_used, clippy::expect_used)]

use nvbind_core::diff::{diff, diff_list, diff_primitive, set_difference, FieldChange, ItemDiff};
use nvbind_core::model::{Fields, Item};
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashSet;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn flat_fields() -> impl Strategy<Value = Fields> {
    prop::collection::btree_map("[a-e]", scalar(), 0..5)
        .prop_map(|m| m.into_iter().collect::<Fields>())
}

fn snapshot() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::btree_map("[a-h]", flat_fields(), 0..6).prop_map(|m| {
        m.into_iter()
            .map(|(url, fields)| Item { url, fields })
            .collect()
    })
}

proptest! {
    #[test]
    fn diff_primitive_of_self_is_empty(x in flat_fields()) {
        prop_assert!(diff_primitive(&x, &x).is_empty());
        prop_assert_eq!(diff(&x, &x), ItemDiff::NoChange);
    }

    #[test]
    fn diff_primitive_unset_iff_key_removed(x in flat_fields(), y in flat_fields()) {
        let d = diff_primitive(&x, &y);
        for key in x.keys().chain(y.keys()) {
            let removed = x.contains_key(key) && !y.contains_key(key);
            prop_assert_eq!(d.get(key) == Some(&FieldChange::Unset), removed);
        }
    }

    #[test]
    fn diff_primitive_sets_hold_new_values(x in flat_fields(), y in flat_fields()) {
        for (key, change) in diff_primitive(&x, &y) {
            if let FieldChange::Set(v) = change {
                prop_assert_eq!(y.get(&key), Some(&v));
                prop_assert_ne!(x.get(&key), Some(&v));
            }
        }
    }

    #[test]
    fn set_difference_preserves_order_and_excludes(
        a in prop::collection::vec("[a-f]", 0..8),
        b in prop::collection::vec("[a-f]", 0..8),
    ) {
        let out = set_difference(&a, &b);
        let b_set: HashSet<&String> = b.iter().collect();
        let expected: Vec<String> = a.iter().filter(|x| !b_set.contains(x)).cloned().collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn diff_list_of_self_is_empty(items in snapshot()) {
        prop_assert!(diff_list(&items, &items).is_empty());
    }

    #[test]
    fn diff_list_partitions_urls(old in snapshot(), new in snapshot()) {
        let d = diff_list(&old, &new);
        let old_urls: HashSet<&str> = old.iter().map(|v| v.url.as_str()).collect();
        let new_urls: HashSet<&str> = new.iter().map(|v| v.url.as_str()).collect();

        // Flat items never become irreconcilable.
        for v in &d.added {
            prop_assert!(!old_urls.contains(v.url.as_str()));
        }
        for v in &d.removed {
            prop_assert!(!new_urls.contains(v.url.as_str()));
        }
        for c in &d.changed {
            prop_assert!(old_urls.contains(c.url.as_str()) && new_urls.contains(c.url.as_str()));
            prop_assert!(!c.changes.is_empty());
        }
        prop_assert_eq!(d.added.len(), new_urls.difference(&old_urls).count());
        prop_assert_eq!(d.removed.len(), old_urls.difference(&new_urls).count());
    }
}

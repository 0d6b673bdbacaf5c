#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Diff engine scenarios over realistic volume and mesh snapshots.

use nvbind_core::diff::{
    diff, diff_list, diff_primitive, render_summary, same_keys, set_difference, FieldChange,
    FieldDiff, ItemDiff,
};
use nvbind_core::model::{Fields, Item};
use serde_json::{json, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fields(v: Value) -> Fields {
    v.as_object().cloned().unwrap()
}

fn item(v: Value) -> Item {
    serde_json::from_value(v).unwrap()
}

fn set(pairs: &[(&str, Value)]) -> FieldDiff {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), FieldChange::Set(v.clone())))
        .collect()
}

fn urls(items: &[Item]) -> Vec<&str> {
    items.iter().map(|v| v.url.as_str()).collect()
}

// ---------------------------------------------------------------------------
// diff_primitive
// ---------------------------------------------------------------------------

#[test]
fn test_diff_primitive_cases() {
    let red = json!([255, 0, 0, 1.0]);
    let yellow = json!([255, 165, 0, 1.0]);

    let cases: Vec<(Value, Value, FieldDiff)> = vec![
        (json!({}), json!({}), FieldDiff::new()),
        (
            json!({"flavor": "salty"}),
            json!({"flavor": "salty"}),
            FieldDiff::new(),
        ),
        (
            json!({"flavor": "salty"}),
            json!({"flavor": "sweet"}),
            set(&[("flavor", json!("sweet"))]),
        ),
        (
            json!({"flavor": "salty"}),
            json!({"flavor": "salty", "pH": 6.2}),
            set(&[("pH", json!(6.2))]),
        ),
        (
            json!({"type": "paint", "color": red}),
            json!({"type": "paint", "color": red}),
            FieldDiff::new(),
        ),
        (
            json!({"type": "paint", "color": red}),
            json!({"type": "paint", "color": yellow}),
            set(&[("color", yellow.clone())]),
        ),
        (
            json!({"type": "paint"}),
            json!({"type": "paint", "color": yellow}),
            set(&[("color", yellow.clone())]),
        ),
    ];

    for (old, new, expected) in cases {
        assert_eq!(
            diff_primitive(&fields(old.clone()), &fields(new.clone())),
            expected,
            "diff_primitive({}, {})",
            old,
            new
        );
    }
}

#[test]
fn test_diff_primitive_removed_key_is_unset() {
    let d = diff_primitive(&fields(json!({"a": 1, "b": 2})), &fields(json!({"a": 1})));
    let mut expected = FieldDiff::new();
    expected.insert("b".into(), FieldChange::Unset);
    assert_eq!(d, expected);

    let d = diff_primitive(
        &fields(json!({"type": "paint", "color": [255, 0, 0, 1.0]})),
        &fields(json!({"type": "paint"})),
    );
    assert_eq!(d.get("color"), Some(&FieldChange::Unset));
}

#[test]
fn test_diff_primitive_null_is_a_value() {
    let d = diff_primitive(
        &fields(json!({"modulationImageUrl": "https://example.com/tstat1.nii.gz"})),
        &fields(json!({"modulationImageUrl": null})),
    );
    assert_eq!(
        d.get("modulationImageUrl"),
        Some(&FieldChange::Set(Value::Null))
    );
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[test]
fn test_diff_unchanged_nested_map_is_no_change() {
    let layers = json!({
        "thickness": {"url": "https://example.com/cortical_thickness.mz3"},
        "curvature": {"url": "https://example.com/curvature.mz3"}
    });
    let x = fields(json!({"name": "wm", "layers": layers}));
    let y = fields(json!({"name": "wm", "layers": layers}));
    assert_eq!(diff(&x, &y), ItemDiff::NoChange);
}

#[test]
fn test_diff_nested_key_set_changes_are_irreconcilable() {
    let both = json!({
        "thickness": {"url": "https://example.com/cortical_thickness.mz3"},
        "curvature": {"url": "https://example.com/curvature.mz3"}
    });
    let curvature_only = json!({"curvature": {"url": "https://example.com/curvature.mz3"}});
    let thickness_only =
        json!({"thickness": {"url": "https://example.com/cortical_thickness.mz3"}});

    let cases = [
        (
            json!({"name": "wm", "layers": both}),
            json!({"name": "wm", "layers": curvature_only}),
            "removed layer thickness",
        ),
        (
            json!({"name": "wm", "layers": thickness_only}),
            json!({"name": "wm", "layers": both}),
            "added layer curvature",
        ),
        (
            json!({"name": "wm", "layers": both}),
            json!({"name": "wm"}),
            "removed all layers",
        ),
        (
            json!({"name": "wm"}),
            json!({"name": "wm", "layers": both}),
            "added layers",
        ),
    ];

    for (x, y, comment) in cases {
        assert_eq!(
            diff(&fields(x), &fields(y)),
            ItemDiff::Irreconcilable,
            "{}",
            comment
        );
    }
}

#[test]
fn test_diff_sub_item_key_set_change_is_irreconcilable() {
    let x = fields(json!({"layers": {"c": {"url": "u"}}}));
    let y = fields(json!({"layers": {"c": {"url": "u", "opacity": 0.0}}}));
    assert!(diff(&x, &y).is_irreconcilable());
}

#[test]
fn test_diff_returns_only_changed_leaf_of_sub_item() {
    let x = fields(json!({
        "name": "wm",
        "layers": {
            "thickness": {"url": "https://example.com/cortical_thickness.mz3", "colorbarVisible": true},
            "curvature": {"url": "https://example.com/curvature.mz3", "colorbarVisible": true}
        }
    }));
    let y = fields(json!({
        "name": "wm",
        "layers": {
            "thickness": {"url": "https://example.com/cortical_thickness.mz3", "colorbarVisible": true},
            "curvature": {"url": "https://example.com/curvature.mz3", "colorbarVisible": false}
        }
    }));

    let mut subs = BTreeMap::new();
    subs.insert(
        "curvature".to_string(),
        set(&[("colorbarVisible", json!(false))]),
    );
    let mut expected = FieldDiff::new();
    expected.insert("layers".into(), FieldChange::Nested(subs));

    assert_eq!(diff(&x, &y), ItemDiff::Partial(expected));
}

#[test]
fn test_diff_merges_nested_and_scalar_changes() {
    let x = fields(json!({"opacity": 0.5, "layers": {"c": {"url": "u", "vis": true}}}));
    let y = fields(json!({"opacity": 1.0, "layers": {"c": {"url": "u", "vis": false}}}));

    let ItemDiff::Partial(d) = diff(&x, &y) else {
        panic!("expected a partial diff");
    };
    assert_eq!(d.get("opacity"), Some(&FieldChange::Set(json!(1.0))));
    assert!(matches!(d.get("layers"), Some(FieldChange::Nested(_))));
    assert_eq!(d.len(), 2);
}

// ---------------------------------------------------------------------------
// diff_list
// ---------------------------------------------------------------------------

#[test]
fn test_diff_list_added_volume() {
    let old = vec![Item::new("x").with_field("opacity", 0.5)];
    let new = vec![
        Item::new("x").with_field("opacity", 0.5),
        Item::new("y").with_field("opacity", 1),
    ];

    let d = diff_list(&old, &new);
    assert_eq!(d.added, vec![new[1].clone()]);
    assert!(d.removed.is_empty());
    assert!(d.changed.is_empty());
}

#[test]
fn test_diff_list_reordering_is_no_change() {
    let a = Item::new("a").with_field("opacity", 0.5);
    let b = Item::new("b").with_field("colormap", "gray");
    let d = diff_list(&[a.clone(), b.clone()], &[b, a]);
    assert!(d.is_empty());
    assert_eq!(render_summary(&d), "No changes.\n");
}

#[test]
fn test_diff_list_mesh_scenario() {
    let before = vec![
        item(json!({"url": "https://example.com/lh.wm.mz3", "opacity": 0.5, "layers": {
            "thickness": {"url": "https://example.com/lh.cortical_thickness.mz3", "opacity": 1.0},
            "curvature": {"url": "https://example.com/lh.wm.curvature.mz3", "opacity": 1.0}}})),
        item(json!({"url": "https://example.com/rh.wm.mz3", "opacity": 0.5, "layers": {
            "thickness": {"url": "https://example.com/rh.cortical_thickness.mz3"},
            "curvature": {"url": "https://example.com/rh.wm.curvature.mz3"}}})),
        item(json!({"url": "https://example.com/gm.mz3", "opacity": 0.5, "layers": {
            "curvature": {"url": "https://example.com/gm.curvature.mz3"}}})),
        item(json!({"url": "https://example.com/pial.mz3", "opacity": 0.0, "layers": {
            "curvature": {"url": "https://example.com/pial.curvature.mz3"}}})),
        item(json!({"url": "https://example.com/hippocampus.mz3", "opacity": 1.0, "visible": true})),
        item(json!({"url": "https://example.com/pons.mz3"})),
    ];
    let after = vec![
        // curvature layer opacity 1.0 -> 0.0
        item(json!({"url": "https://example.com/lh.wm.mz3", "opacity": 0.5, "layers": {
            "thickness": {"url": "https://example.com/lh.cortical_thickness.mz3", "opacity": 1.0},
            "curvature": {"url": "https://example.com/lh.wm.curvature.mz3", "opacity": 0.0}}})),
        // unchanged
        item(json!({"url": "https://example.com/rh.wm.mz3", "opacity": 0.5, "layers": {
            "thickness": {"url": "https://example.com/rh.cortical_thickness.mz3"},
            "curvature": {"url": "https://example.com/rh.wm.curvature.mz3"}}})),
        // gained a layer
        item(json!({"url": "https://example.com/gm.mz3", "opacity": 0.5, "layers": {
            "curvature": {"url": "https://example.com/gm.curvature.mz3"},
            "sulcal_depth": {"url": "https://example.com/sulcal_depth.mz3", "colormap": "jet"}}})),
        // gained "visible", lost "opacity"
        item(json!({"url": "https://example.com/pial.mz3", "visible": false, "layers": {
            "curvature": {"url": "https://example.com/pial.curvature.mz3"}}})),
        item(json!({"url": "https://example.com/hippocampus.mz3", "opacity": 1.0, "visible": false})),
        item(json!({"url": "https://example.com/brainstem.mz3"})),
    ];

    let d = diff_list(&before, &after);

    assert_eq!(
        urls(&d.added),
        vec!["https://example.com/gm.mz3", "https://example.com/brainstem.mz3"]
    );
    assert_eq!(
        urls(&d.removed),
        vec!["https://example.com/gm.mz3", "https://example.com/pons.mz3"]
    );
    assert_eq!(d.added[0], after[2]);
    assert_eq!(d.removed[0], before[2]);

    let changed: Vec<&str> = d.changed.iter().map(|c| c.url.as_str()).collect();
    assert_eq!(
        changed,
        vec![
            "https://example.com/lh.wm.mz3",
            "https://example.com/pial.mz3",
            "https://example.com/hippocampus.mz3",
        ]
    );

    let mut layer = BTreeMap::new();
    layer.insert("curvature".to_string(), set(&[("opacity", json!(0.0))]));
    let mut wm_left = FieldDiff::new();
    wm_left.insert("layers".into(), FieldChange::Nested(layer));
    assert_eq!(d.changed[0].changes, wm_left);

    let mut pial = set(&[("visible", json!(false))]);
    pial.insert("opacity".into(), FieldChange::Unset);
    assert_eq!(d.changed[1].changes, pial);

    assert_eq!(d.changed[2].changes, set(&[("visible", json!(false))]));
}

#[test]
fn test_diff_list_irreconcilable_item_in_both_sets() {
    let old = vec![item(json!({"url": "m", "layers": {"a": {"url": "a"}}}))];
    let new = vec![item(json!({"url": "m", "layers": {"a": {"url": "a"}, "b": {"url": "b"}}}))];

    let d = diff_list(&old, &new);
    assert_eq!(d.added, new);
    assert_eq!(d.removed, old);
    assert!(d.changed.is_empty());
}

// ---------------------------------------------------------------------------
// set_difference / same_keys
// ---------------------------------------------------------------------------

#[test]
fn test_set_difference_cases() {
    let cases: [(&[&str], &[&str], &[&str]); 6] = [
        (&["a", "b", "c"], &["a", "b", "c"], &[]),
        (&["a", "b", "c"], &["a", "b"], &["c"]),
        (&["b", "c", "a"], &["a", "b"], &["c"]),
        (&["a", "b", "c"], &["a"], &["b", "c"]),
        (&["a", "b"], &["a", "b", "c"], &[]),
        (&["a", "b"], &["a", "c"], &["b"]),
    ];
    for (a, b, expected) in cases {
        assert_eq!(set_difference(a, b), expected.to_vec(), "{:?} - {:?}", a, b);
    }
}

#[test]
fn test_same_keys_cases() {
    let cases = [
        (json!({"a": "apple", "b": "bear"}), json!({"a": "apple", "b": "bear"}), true),
        (json!({"a": "apple", "b": "bear"}), json!({"b": "bear", "a": "apple"}), true),
        (json!({"a": "apple", "c": "bear"}), json!({"b": "bear", "a": "apple"}), false),
        (
            json!({"a": "apple", "b": "bear"}),
            json!({"b": "bear", "a": "apple", "c": "cranberry"}),
            false,
        ),
    ];
    for (a, b, expected) in cases {
        assert_eq!(same_keys(&fields(a.clone()), &fields(b.clone())), expected, "{} {}", a, b);
    }
}

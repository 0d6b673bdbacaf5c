//! Human-readable summary renderer for list diffs.

use crate::diff::model::{FieldChange, FieldDiff, ListDiff};

/// Render a plain-text summary of a [`ListDiff`].
///
/// Informational only; the structured diff is what the mutator consumes.
pub fn render_summary(diff: &ListDiff) -> String {
    let mut out = String::new();

    if diff.is_empty() {
        out.push_str("No changes.\n");
        return out;
    }

    if !diff.added.is_empty() {
        out.push_str(&format!("Added ({}):\n", diff.added.len()));
        for item in &diff.added {
            out.push_str(&format!("  + {}\n", item.url));
        }
    }

    if !diff.removed.is_empty() {
        out.push_str(&format!("Removed ({}):\n", diff.removed.len()));
        for item in &diff.removed {
            out.push_str(&format!("  - {}\n", item.url));
        }
    }

    if !diff.changed.is_empty() {
        out.push_str(&format!("Changed ({}):\n", diff.changed.len()));
        for change in &diff.changed {
            out.push_str(&format!("  ~ {}\n", change.url));
            render_fields(&mut out, &change.changes, 4);
        }
    }

    out
}

fn render_fields(out: &mut String, changes: &FieldDiff, indent: usize) {
    let pad = " ".repeat(indent);
    for (field, change) in changes {
        match change {
            FieldChange::Set(value) => out.push_str(&format!("{pad}{field} = {value}\n")),
            FieldChange::Unset => out.push_str(&format!("{pad}{field} (unset)\n")),
            FieldChange::Nested(subs) => {
                out.push_str(&format!("{pad}{field}:\n"));
                for (sub_key, sub_changes) in subs {
                    out.push_str(&format!("{pad}  [{sub_key}]\n"));
                    render_fields(out, sub_changes, indent + 4);
                }
            }
        }
    }
}

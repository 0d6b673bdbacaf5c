//! Structural diff engine.
//!
//! Compares two declarative snapshots of viewer state and reports what the
//! mutator has to do to move the viewer from one to the other.
//!
//! ## Entry points
//!
//! ```
//! use nvbind_core::diff::{diff_list, render_summary};
//! use nvbind_core::Item;
//!
//! let old = vec![Item::new("x").with_field("opacity", 0.5)];
//! let new = vec![
//!     Item::new("x").with_field("opacity", 0.5),
//!     Item::new("y").with_field("opacity", 1.0),
//! ];
//! let d = diff_list(&old, &new);
//! assert_eq!(d.added.len(), 1);
//! println!("{}", render_summary(&d));
//! ```
//!
//! ## Guarantees
//!
//! - **Identity by URL**: items are matched by identifier, never by position,
//!   so reordering a snapshot is a no-op.
//! - **Three-way outcome**: per item the result is no change, a partial field
//!   diff, or irreconcilable. Irreconcilable items show up in both `removed`
//!   and `added` so the caller reloads them.
//! - **Determinism**: field diffs are ordered maps; list results keep the
//!   order of the snapshot they were taken from.

pub mod engine;
pub mod model;
pub mod summary;

pub use engine::{diff, diff_list, diff_primitive, same_keys, set_difference};
pub use model::{FieldChange, FieldDiff, ItemChange, ItemDiff, ListDiff};
pub use summary::render_summary;

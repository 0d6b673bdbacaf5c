//! nvbind Core - reconciliation kernel for a declarative viewer binding
//!
//! This crate provides everything needed to drive a stateful medical image
//! viewer from declarative snapshots of desired state:
//! - Item and option models with identifier-based matching
//! - The structural diff engine (field, nested-map and list level)
//! - The viewer port describing the capability surface the binding relies on
//! - The mutator that turns computed diffs into viewer calls
//! - Error and logging facilities shared by the engine and CLI
//!
//! The orchestrator that owns a viewer across passes lives in `nvbind-engine`.

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod mutator;
pub mod viewer;

#[doc(hidden)]
pub use nvbind_core_types as core_types;

// Re-export commonly used types
pub use config::BindingConfig;
pub use diff::{diff, diff_list, diff_primitive, set_difference, ItemDiff, ListDiff};
pub use errors::{BindingError, ExError, ExErrorKind, Result};
pub use model::{Item, ViewerOptions};
pub use mutator::{Mutator, RoutingTable};
pub use viewer::{Viewer, ViewerError, VolumeHandle};

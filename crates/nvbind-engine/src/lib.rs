//! nvbind Engine - Orchestration layer
//!
//! Owns one viewer for the lifetime of a mounted binding and runs a
//! reconciliation pass for every new declarative input, coordinating the
//! diff engine and the mutator from `nvbind-core`.

pub mod binding;
pub mod shared;

pub use binding::{Binding, BindingState, PassOutcome, Props};
pub use shared::SharedBinding;

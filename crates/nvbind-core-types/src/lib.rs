//! Core types shared across nvbind facilities
//!
//! This crate provides foundational types used by the diff engine, the
//! mutator, the logging facility and the binding orchestrator:
//!
//! - **Correlation types**: PassId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::PassId;

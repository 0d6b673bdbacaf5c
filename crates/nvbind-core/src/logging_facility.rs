//! Structured logging for bindings, the mutator and the CLI
//!
//! `init(profile)` installs the subscriber once per process. Operations log
//! through the `log_op_*` macros so every event carries the same
//! `component`/`op`/`event` triple; recoverable skips use `log_op_warn!`.
//! Reconciliation passes additionally carry `pass_id`.
//!
//! ```rust
//! use nvbind_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile, FILTER_ENV};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

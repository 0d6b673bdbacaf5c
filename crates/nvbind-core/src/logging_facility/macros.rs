//! Operation logging macros
//!
//! Every event carries `component`, `op` and `event`. Extra fields and an
//! optional message follow, in `tracing` syntax.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($rest:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($rest)*)?
        )
    };
}

/// Operation start, at info
///
/// ```
/// # use nvbind_core::log_op_start;
/// log_op_start!("load_volumes");
/// log_op_start!("load_volumes", count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($rest:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($rest)*)?)
    };
}

/// Operation end, at info; `duration_ms` is mandatory
///
/// ```
/// # use nvbind_core::log_op_end;
/// log_op_end!("load_volumes", duration_ms = 42);
/// log_op_end!("reconcile_pass", duration_ms = 7, changed = true);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($rest:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_END, duration_ms = $duration $(, $($rest)*)?)
    };
}

/// Operation failure, at error, with the rendered error and its stable kind and code
///
/// `$err` is anything convertible into [`ExError`](crate::errors::ExError).
///
/// ```
/// # use nvbind_core::{log_op_error, errors::BindingError};
/// let err = BindingError::VolumeNotFound { url: "a.nii".to_string() };
/// log_op_error!("apply_volume_changes", err, duration_ms = 10, url = "a.nii");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($rest:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            error = %ex_err,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code()
            $(, $($rest)*)?
        )
    }};
}

/// A skipped entry, at warn; the operation itself carries on
///
/// ```
/// # use nvbind_core::log_op_warn;
/// log_op_warn!("apply_options", option_key = "bogus", "Don't know how to handle bogus=1");
/// ```
#[macro_export]
macro_rules! log_op_warn {
    ($op:expr, $($rest:tt)+) => {
        $crate::__log_op_event!(warn, $op, EVENT_WARN, $($rest)+)
    };
}

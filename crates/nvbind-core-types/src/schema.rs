//! Field and event names shared by the logging macros and log consumers
//!
//! `tracing` takes field names as identifiers, so emitters spell them out;
//! these constants are for code that reads events back (test capture, log
//! processing).

/// Module path of the emitter
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
/// One of the `EVENT_*` names below
pub const FIELD_EVENT: &str = "event";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_DURATION_MS: &str = "duration_ms";
/// Set on the boundaries of a reconciliation pass
pub const FIELD_PASS_ID: &str = "pass_id";

pub const FIELD_URL: &str = "url";
pub const FIELD_OPTION_KEY: &str = "option_key";

/// Rendered `ExError`, including its pass and subject context
pub const FIELD_ERROR: &str = "error";
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
/// A skipped entry; the operation carried on
pub const EVENT_WARN: &str = "warn";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        let events = [EVENT_START, EVENT_END, EVENT_END_ERROR, EVENT_WARN];
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_error_fields_share_prefix() {
        assert!(FIELD_ERR_KIND.starts_with("err."));
        assert!(FIELD_ERR_CODE.starts_with("err."));
    }
}

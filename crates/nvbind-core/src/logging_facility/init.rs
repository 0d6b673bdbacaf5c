//! Subscriber installation.
//!
//! Logs go to stderr so that commands printing viewer calls or diffs on
//! stdout stay machine-readable.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the profile's default filter.
pub const FILTER_ENV: &str = "NVBIND_LOG";

/// Output profile, selected by `log_profile` in the binding configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable lines, pass internals at debug
    #[default]
    Development,
    /// One JSON object per event, pass boundaries and warnings only
    Production,
    /// Nothing installed; tests use `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter used when [`FILTER_ENV`] is unset.
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "nvbind_core=debug,nvbind_engine=debug,nvbind=debug",
            Profile::Production | Profile::Test => "nvbind_core=info,nvbind_engine=info,nvbind=info",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call has an effect. A subscriber installed elsewhere
/// beforehand is left in place.
///
/// ```
/// use nvbind_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(profile.filter())
                .with_writer(std::io::stderr)
                .finish()
                .try_init()
                .ok();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.filter())
                .with_writer(std::io::stderr)
                .finish()
                .try_init()
                .ok();
        }
        Profile::Test => {}
    });
}

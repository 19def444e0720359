//! Logging setup
//!
//! limbsync only emits `tracing` events. Hosts that do not install their own
//! subscriber can call [`init_logging`] once at startup.

use limbsync_core::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Subscriber settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `"limbsync_sync=debug"`
    pub filter: String,
    /// Emit newline-delimited JSON instead of human-readable lines
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over [`LogConfig::filter`]. Fails if the
/// filter does not parse or a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> SyncResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| SyncError::InvalidConfig(format!("log filter: {e}")))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| SyncError::InvalidConfig(format!("logging: {e}")))
}

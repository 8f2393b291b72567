//! # Navigation Telemetry
//!
//! Structured logging for the navigation coordinator and its hosts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nav_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // Application code; tracing events now reach stderr.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NAV_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `NAV_JSON_LOGS` | `false` (`true` in containers) | JSON lines output |
//! | `NAV_CONSOLE_OUTPUT` | `true` | Write logs at all |
//! | `NAV_SERVICE_NAME` | `nav-coordinator` | Service name in the startup event |

mod config;
mod logging;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging from a configuration.
///
/// Call once, early in `main`.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(&config)
}

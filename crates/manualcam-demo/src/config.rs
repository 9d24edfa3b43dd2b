//! Runtime configuration for the demo controller.

use std::path::PathBuf;
use std::time::Duration;

/// Default lens position readback cadence.
const DEFAULT_POLL_MS: u64 = 500;
/// Default tracing filter.
const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration for the ManualCam demo controller.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// How often the controller reads the lens position back.
    pub poll_interval: Duration,
    /// Optional JSON control profile overriding the device-derived one.
    pub profile_path: Option<PathBuf>,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(
                std::env::var("MANUALCAM_POLL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|ms| *ms > 0)
                    .unwrap_or(DEFAULT_POLL_MS),
            ),
            profile_path: std::env::var_os("MANUALCAM_PROFILE").map(PathBuf::from),
            log_filter: std::env::var("MANUALCAM_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

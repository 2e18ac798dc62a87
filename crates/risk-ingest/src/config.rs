//! Client configuration. Defaults can be overridden through environment
//! variables; the CLI layers its flags on top.

use std::time::Duration;

use crate::probe::ForceMode;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Health probes must answer quickly or the backend counts as unavailable.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(3);
/// Upstream inference is slow; data requests get a generous budget.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Artificial delay before serving mock data, matching live loading timing.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Root URL of the prediction service, without a trailing slash.
    pub base_url: String,
    pub health_timeout: Duration,
    pub request_timeout: Duration,
    pub mock_delay: Duration,
    /// Initial override of availability auto-detection.
    pub force_mode: ForceMode,
}

impl ClientConfig {
    /// Built-in defaults pointed at `base_url`, ignoring the environment.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            mock_delay: DEFAULT_MOCK_DELAY,
            force_mode: ForceMode::Auto,
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_url =
            std::env::var("HEATRISK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let health_timeout =
            env_millis("HEATRISK_HEALTH_TIMEOUT_MS").unwrap_or(DEFAULT_HEALTH_TIMEOUT);
        let request_timeout =
            env_millis("HEATRISK_REQUEST_TIMEOUT_MS").unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let mock_delay = env_millis("HEATRISK_MOCK_DELAY_MS").unwrap_or(DEFAULT_MOCK_DELAY);
        let force_mode = std::env::var("HEATRISK_FORCE_MODE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            base_url: trim_base_url(base_url),
            health_timeout,
            request_timeout,
            mock_delay,
            force_mode,
        }
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

//! Backend availability detection with a process-lifetime memo.
//!
//! The probe is an owned object rather than global state so each session (and
//! each test) can carry its own cache.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::wire::{self, HealthPayload};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Caller override of auto-detection.
pub enum ForceMode {
    /// Probe the backend and trust the memoized answer.
    #[default]
    Auto,
    /// Always serve mock data; never probe.
    Mock,
    /// Always attempt the live backend, even if the probe says otherwise.
    Live,
}

impl ForceMode {
    /// `Some(true)` forces mock, `Some(false)` forces live, `None` is auto.
    pub fn from_mock_flag(mock: Option<bool>) -> Self {
        match mock {
            Some(true) => ForceMode::Mock,
            Some(false) => ForceMode::Live,
            None => ForceMode::Auto,
        }
    }
}

impl FromStr for ForceMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(ForceMode::Auto),
            "mock" => Ok(ForceMode::Mock),
            "live" => Ok(ForceMode::Live),
            other => Err(format!("unknown force mode {other:?} (expected auto, mock or live)")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AvailabilityState {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl AvailabilityState {
    fn from_probe(available: bool) -> Self {
        if available {
            AvailabilityState::Available
        } else {
            AvailabilityState::Unavailable
        }
    }

    fn memoized(self) -> Option<bool> {
        match self {
            AvailabilityState::Unknown => None,
            AvailabilityState::Available => Some(true),
            AvailabilityState::Unavailable => Some(false),
        }
    }
}

#[derive(Debug, Default)]
struct ProbeCache {
    state: AvailabilityState,
    force: ForceMode,
    /// Bumped whenever the memo is invalidated; a probe that started under an
    /// older generation must not write its result back.
    generation: u64,
}

impl ProbeCache {
    /// Answer without probing, if the force mode and memo allow it.
    fn settled(&self) -> Option<bool> {
        match (self.force, self.state.memoized()) {
            (ForceMode::Mock, _) => Some(false),
            (ForceMode::Live, Some(_)) => Some(true),
            (ForceMode::Auto, memo) => memo,
            (ForceMode::Live, None) => None,
        }
    }

    fn invalidate(&mut self) {
        self.state = AvailabilityState::Unknown;
        self.generation += 1;
    }
}

/// Health probe against `GET /health` with a memoized result.
pub struct AvailabilityProbe {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    cache: Mutex<ProbeCache>,
    /// Held for the duration of a health request so concurrent checks share it.
    in_flight: tokio::sync::Mutex<()>,
}

impl AvailabilityProbe {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            url: config.endpoint("health"),
            timeout: config.health_timeout,
            cache: Mutex::new(ProbeCache {
                state: AvailabilityState::Unknown,
                force: config.force_mode,
                generation: 0,
            }),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    // Never held across an await; a poisoned lock still holds a usable cache.
    fn cache(&self) -> MutexGuard<'_, ProbeCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> AvailabilityState {
        self.cache().state
    }

    pub fn force_mode(&self) -> ForceMode {
        self.cache().force
    }

    /// Override auto-detection. Forcing mock drops the memo so a later live
    /// or auto check cannot reuse an answer that was never probed for.
    pub fn set_force_mode(&self, mode: ForceMode) {
        let mut cache = self.cache();
        if mode == ForceMode::Mock {
            cache.invalidate();
        }
        cache.force = mode;
        info!(?mode, "availability force mode set");
    }

    /// Forget the memoized probe result.
    pub fn reset_cache(&self) {
        self.cache().invalidate();
        debug!("availability cache reset");
    }

    /// Whether data fetches should take the live path.
    ///
    /// Probes at most once per cache window; concurrent callers wait on the
    /// same health request. Under [`ForceMode::Live`] the probe still runs
    /// (and is memoized) but the answer is always `true`.
    pub async fn check_availability(&self) -> bool {
        let settled = self.cache().settled();
        if let Some(available) = settled {
            debug!(available, "availability served from cache");
            return available;
        }

        let _flight = self.in_flight.lock().await;
        let generation = {
            let cache = self.cache();
            if let Some(available) = cache.settled() {
                debug!(available, "availability settled by concurrent probe");
                return available;
            }
            cache.generation
        };

        let available = match self.probe().await {
            Ok(()) => {
                info!(url = %self.url, "prediction backend available");
                true
            }
            Err(err) => {
                warn!(url = %self.url, kind = err.kind(), "prediction backend unavailable: {err}");
                false
            }
        };
        metrics::counter!(
            "heatrisk_probe_total",
            "result" => if available { "available" } else { "unavailable" }
        )
        .increment(1);

        let mut cache = self.cache();
        if cache.generation == generation {
            cache.state = AvailabilityState::from_probe(available);
        } else {
            debug!(available, "cache invalidated during probe, result not memoized");
        }
        match cache.force {
            ForceMode::Live => true,
            ForceMode::Mock => false,
            ForceMode::Auto => available,
        }
    }

    async fn probe(&self) -> Result<(), FetchError> {
        let response = self
            .http
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::NetworkUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BackendNotReady(format!(
                "health check responded with {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(FetchError::NetworkUnavailable)?;
        let payload: HealthPayload = wire::parse_payload(&bytes)?;
        wire::check_health(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_mode_parsing() {
        assert_eq!("MOCK".parse::<ForceMode>(), Ok(ForceMode::Mock));
        assert_eq!(" live ".parse::<ForceMode>(), Ok(ForceMode::Live));
        assert_eq!("".parse::<ForceMode>(), Ok(ForceMode::Auto));
        assert!("sometimes".parse::<ForceMode>().is_err());
    }

    #[test]
    fn mock_flag_mapping() {
        assert_eq!(ForceMode::from_mock_flag(Some(true)), ForceMode::Mock);
        assert_eq!(ForceMode::from_mock_flag(Some(false)), ForceMode::Live);
        assert_eq!(ForceMode::from_mock_flag(None), ForceMode::Auto);
    }

    #[tokio::test]
    async fn forced_mock_never_probes() {
        let mut config = ClientConfig::new("http://127.0.0.1:9");
        config.force_mode = ForceMode::Mock;
        let probe = AvailabilityProbe::new(reqwest::Client::new(), &config);
        assert!(!probe.check_availability().await);
        assert_eq!(probe.state(), AvailabilityState::Unknown);
    }

    #[test]
    fn invalidation_bumps_generation() {
        let mut cache = ProbeCache {
            state: AvailabilityState::Available,
            force: ForceMode::Auto,
            generation: 0,
        };
        assert_eq!(cache.settled(), Some(true));
        cache.invalidate();
        assert_eq!(cache.generation, 1);
        assert_eq!(cache.settled(), None);
        cache.force = ForceMode::Live;
        assert_eq!(cache.settled(), None);
        cache.force = ForceMode::Mock;
        assert_eq!(cache.settled(), Some(false));
    }
}

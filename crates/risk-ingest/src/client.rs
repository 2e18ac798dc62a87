//! Probe-gated data client with mock fallback.
//!
//! Each fetch consults the availability probe first. Unavailable backends get
//! mock data after a short delay; available ones get a real request, and any
//! failure on that request downgrades to mock exactly once. Nothing is
//! retried and no error escapes past this module.

use std::future::Future;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use zone_core::{Forecast, HeatZone, PredictionSummary, mock};

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::probe::AvailabilityProbe;
use crate::sourced::Sourced;
use crate::wire::{self, FeatureCollection, ForecastPayload};

/// Bounds applied to the requested forecast length.
pub const MAX_FORECAST_DAYS: u32 = 30;

pub struct DataClient {
    http: reqwest::Client,
    config: ClientConfig,
    probe: Arc<AvailabilityProbe>,
}

impl DataClient {
    /// Build a client with its own probe.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let probe = Arc::new(AvailabilityProbe::new(http.clone(), &config));
        Ok(Self {
            http,
            config,
            probe,
        })
    }

    /// Build a client that shares an existing probe, its cache and its
    /// connection pool.
    pub fn with_probe(config: ClientConfig, probe: Arc<AvailabilityProbe>) -> Self {
        Self {
            http: probe.http_client().clone(),
            config,
            probe,
        }
    }

    pub fn probe(&self) -> &Arc<AvailabilityProbe> {
        &self.probe
    }

    /// Zones for `date` shifted by `day_offset` days.
    #[instrument(skip(self))]
    pub async fn fetch_zones(&self, date: NaiveDate, day_offset: u32) -> Sourced<Vec<HeatZone>> {
        let fallback = || mock::mock_zones(date, day_offset);
        if !self.probe.check_availability().await {
            return self.serve_mock("zones", fallback).await;
        }

        let live = async {
            let query = [
                ("date", date.to_string()),
                ("day_offset", day_offset.to_string()),
            ];
            let collection: FeatureCollection = self.get_payload("map", &query).await?;
            wire::collection_to_zones(collection, Utc::now())
        };
        self.live_or_fallback("zones", live, fallback).await
    }

    /// Single-point prediction. `None` in mock mode or on any failure; the
    /// caller decides what to show instead.
    #[instrument(skip(self))]
    pub async fn fetch_prediction(&self) -> Option<PredictionSummary> {
        if !self.probe.check_availability().await {
            debug!("prediction skipped, backend unavailable");
            return None;
        }

        match self.get_payload::<PredictionSummary>("predict", &[]).await {
            Ok(summary) => {
                record_fetch("prediction", "live");
                Some(summary)
            }
            Err(err) => {
                record_fallback("prediction", &err);
                warn!(kind = err.kind(), "prediction request failed: {err}");
                None
            }
        }
    }

    /// Daily forecast for the next `days` days (clamped to 1..=30).
    #[instrument(skip(self))]
    pub async fn fetch_forecast(&self, days: u32) -> Sourced<Forecast> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let fallback = || mock::mock_forecast(Utc::now().date_naive(), days);
        if !self.probe.check_availability().await {
            return self.serve_mock("forecast", fallback).await;
        }

        let live = async {
            let query = [("days", days.to_string())];
            let payload: ForecastPayload = self.get_payload("forecast", &query).await?;
            Ok::<_, FetchError>(wire::forecast_from_payload(payload))
        };
        self.live_or_fallback("forecast", live, fallback).await
    }

    async fn live_or_fallback<T>(
        &self,
        operation: &'static str,
        live: impl Future<Output = Result<T, FetchError>>,
        mock: impl FnOnce() -> T,
    ) -> Sourced<T> {
        match live.await {
            Ok(data) => {
                record_fetch(operation, "live");
                info!(operation, "served live data");
                Sourced::Live(data)
            }
            Err(err) => {
                record_fallback(operation, &err);
                warn!(
                    operation,
                    kind = err.kind(),
                    "live request failed, using mock data: {err}"
                );
                record_fetch(operation, "mock");
                Sourced::Mock(mock())
            }
        }
    }

    async fn serve_mock<T>(&self, operation: &'static str, mock: impl FnOnce() -> T) -> Sourced<T> {
        if !self.config.mock_delay.is_zero() {
            tokio::time::sleep(self.config.mock_delay).await;
        }
        record_fetch(operation, "mock");
        info!(operation, "served mock data");
        Sourced::Mock(mock())
    }

    async fn get_payload<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(self.config.endpoint(path))
            .query(query)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(FetchError::NetworkUnavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BackendNotReady(format!(
                "/{path} responded with {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(FetchError::NetworkUnavailable)?;
        wire::parse_payload(&bytes)
    }
}

fn record_fetch(operation: &'static str, source: &'static str) {
    metrics::counter!("heatrisk_fetch_total", "operation" => operation, "source" => source)
        .increment(1);
}

fn record_fallback(operation: &'static str, err: &FetchError) {
    metrics::counter!("heatrisk_fallback_total", "operation" => operation, "kind" => err.kind())
        .increment(1);
}

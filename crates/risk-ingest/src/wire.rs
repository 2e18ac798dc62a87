//! Upstream payload shapes and their conversion into zone-core types.
//!
//! Every field is untrusted. Anything that does not match the expected shape
//! becomes a `FetchError` so the caller can fall back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;
use zone_core::{
    DailyForecast, Forecast, GeometryError, HeatZone, LatLon, Position, Severity, ZoneProperties,
    polygon_center, temperature_to_probability,
};

use crate::error::FetchError;

/// Confidence assumed when a live feature does not report one.
const DEFAULT_LIVE_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Deserialize)]
pub(crate) struct HealthPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub id: Option<Value>,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureProperties {
    pub temperature: f64,
    pub risk_level: i64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ForecastPayload {
    Wrapped { forecast: Vec<ForecastDay> },
    Bare(Vec<ForecastDay>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: f64,
    #[serde(default)]
    pub risk_level: Option<i64>,
    #[serde(default)]
    pub probability: Option<f64>,
}

/// Decode a 2xx body, rejecting bodies that carry an explicit `error` field.
pub(crate) fn parse_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FetchError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| FetchError::MalformedResponse(format!("invalid JSON: {err}")))?;
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let detail = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(FetchError::BackendNotReady(detail));
    }
    serde_json::from_value(value).map_err(|err| FetchError::MalformedResponse(err.to_string()))
}

/// Readiness requires a reachable service that confirms the model is loaded.
pub(crate) fn check_health(payload: &HealthPayload) -> Result<(), FetchError> {
    match payload.model_loaded {
        Some(true) => Ok(()),
        Some(false) => Err(FetchError::BackendNotReady(format!(
            "model not loaded (status {})",
            payload.status.as_deref().unwrap_or("unknown")
        ))),
        None => Err(FetchError::BackendNotReady(
            "health response lacks model_loaded".into(),
        )),
    }
}

fn outer_ring(coordinates: Vec<Vec<Vec<f64>>>) -> Result<Vec<Position>, GeometryError> {
    let ring = coordinates.into_iter().next().ok_or(GeometryError::EmptyRing)?;
    let ring: Vec<Position> = ring
        .into_iter()
        .filter_map(|vertex| match vertex.as_slice() {
            [lon, lat, ..] => Some([*lon, *lat]),
            _ => None,
        })
        .collect();
    zone_core::geo::validate_ring(&ring)?;
    Ok(ring)
}

/// Display name derived from the centre, e.g. `Zone 13.756°N, 100.502°E`.
pub(crate) fn zone_name(center: LatLon) -> String {
    let ns = if center.lat >= 0.0 { 'N' } else { 'S' };
    let ew = if center.lon >= 0.0 { 'E' } else { 'W' };
    format!(
        "Zone {:.3}°{ns}, {:.3}°{ew}",
        center.lat.abs(),
        center.lon.abs()
    )
}

fn feature_id(id: Option<&Value>, index: usize) -> String {
    match id {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("zone-{index}"),
    }
}

fn feature_to_zone(
    index: usize,
    feature: Feature,
    fetched_at: DateTime<Utc>,
) -> Result<HeatZone, FetchError> {
    let Geometry::Polygon { coordinates } = feature.geometry else {
        return Err(FetchError::MalformedResponse(format!(
            "feature {index} is not a polygon"
        )));
    };
    let ring = outer_ring(coordinates)?;
    let center = polygon_center(&ring)?;
    let props = feature.properties;
    let properties = ZoneProperties {
        name: zone_name(center),
        probability: temperature_to_probability(props.temperature),
        severity: Severity::from_risk_level(props.risk_level),
        temperature: props.temperature,
        confidence: props.confidence.unwrap_or(DEFAULT_LIVE_CONFIDENCE),
        last_update: fetched_at,
    };
    Ok(HeatZone::new(feature_id(feature.id.as_ref(), index), ring, properties)?)
}

/// Convert a feature collection into zones.
///
/// Individual features with unusable geometry are skipped. If every feature
/// is unusable the whole response is rejected.
pub(crate) fn collection_to_zones(
    collection: FeatureCollection,
    fetched_at: DateTime<Utc>,
) -> Result<Vec<HeatZone>, FetchError> {
    let total = collection.features.len();
    let mut zones = Vec::with_capacity(total);
    let mut first_error = None;

    for (index, feature) in collection.features.into_iter().enumerate() {
        match feature_to_zone(index, feature, fetched_at) {
            Ok(zone) => zones.push(zone),
            Err(err) => {
                warn!(index, kind = err.kind(), "skipping live feature: {err}");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) if zones.is_empty() => Err(err),
        _ => Ok(zones),
    }
}

pub(crate) fn forecast_from_payload(payload: ForecastPayload) -> Forecast {
    let days = match payload {
        ForecastPayload::Wrapped { forecast } => forecast,
        ForecastPayload::Bare(days) => days,
    };
    let days = days
        .into_iter()
        .enumerate()
        .map(|(offset, day)| {
            let probability = day
                .probability
                .unwrap_or_else(|| temperature_to_probability(day.temperature))
                .clamp(0.0, 1.0);
            let severity = day
                .risk_level
                .map(Severity::from_risk_level)
                .unwrap_or_else(|| Severity::from_probability(probability));
            DailyForecast {
                date: day.date,
                day_offset: u32::try_from(offset).unwrap_or(u32::MAX),
                probability,
                severity,
                temperature: day.temperature,
            }
        })
        .collect();
    Forecast { days }
}

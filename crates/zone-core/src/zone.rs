//! Heat-risk zone model shared by the ingest client and its consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{self, GeometryError, LatLon, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Ordinal risk category.
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Classify a probability. Probability is the single source of truth for
    /// severity on synthesized data.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Severity::Low
        } else if probability < 0.5 {
            Severity::Medium
        } else if probability < 0.7 {
            Severity::High
        } else {
            Severity::Critical
        }
    }

    /// Map the upstream integer risk code, clamping out-of-range values.
    pub fn from_risk_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Severity::Low,
            1 => Severity::Medium,
            2 => Severity::High,
            _ => Severity::Critical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub name: String,
    /// Display probability in `[0, 1]`.
    pub probability: f64,
    pub severity: Severity,
    /// Surface temperature in degrees Celsius.
    pub temperature: f64,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    pub last_update: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// A polygon tagged with heat-risk properties.
///
/// Zones are immutable once built and are replaced wholesale on every fetch.
pub struct HeatZone {
    id: String,
    ring: Vec<Position>,
    properties: ZoneProperties,
}

impl HeatZone {
    /// Build a zone, enforcing a closed ring of at least four vertices and
    /// clamping probability and confidence into `[0, 1]`.
    pub fn new(
        id: impl Into<String>,
        ring: Vec<Position>,
        mut properties: ZoneProperties,
    ) -> Result<Self, GeometryError> {
        geo::validate_ring(&ring)?;
        properties.probability = properties.probability.clamp(0.0, 1.0);
        properties.confidence = properties.confidence.clamp(0.0, 1.0);
        Ok(Self {
            id: id.into(),
            ring,
            properties,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Closed `[lon, lat]` ring; first vertex repeated as last.
    pub fn ring(&self) -> &[Position] {
        &self.ring
    }

    pub fn properties(&self) -> &ZoneProperties {
        &self.properties
    }

    pub fn center(&self) -> Result<LatLon, GeometryError> {
        geo::polygon_center(&self.ring)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
/// Location reported once per session by the host environment.
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in metres, when the host reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

impl UserLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Map viewport: a centre and a span in degrees.
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    /// Span used when centring on a resolved user location.
    pub const USER_SPAN: f64 = 0.15;

    pub fn around(location: &UserLocation) -> Self {
        Self {
            latitude: location.latitude,
            longitude: location.longitude,
            latitude_delta: Self::USER_SPAN,
            longitude_delta: Self::USER_SPAN,
        }
    }
}

impl Default for Region {
    /// Central Bangkok, wide enough to show the whole metro area.
    fn default() -> Self {
        Self {
            latitude: 13.7563,
            longitude: 100.5018,
            latitude_delta: 0.5,
            longitude_delta: 0.5,
        }
    }
}

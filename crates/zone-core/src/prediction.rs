//! Point prediction and multi-day forecast records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::zone::Severity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Single-point prediction summary returned by the inference service.
pub struct PredictionSummary {
    pub probability: f64,
    pub risk_level: i64,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl PredictionSummary {
    pub fn severity(&self) -> Severity {
        Severity::from_risk_level(self.risk_level)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day_offset: u32,
    pub probability: f64,
    pub severity: Severity,
    pub temperature: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub days: Vec<DailyForecast>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Highest-probability day, first one wins on ties.
    pub fn peak(&self) -> Option<&DailyForecast> {
        self.days.iter().fold(None, |best: Option<&DailyForecast>, day| match best {
            Some(current) if current.probability >= day.probability => Some(current),
            _ => Some(day),
        })
    }
}

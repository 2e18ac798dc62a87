//! Deterministic synthetic data served when the live backend is not usable.
//!
//! Output depends only on the requested date and day offset, so repeated
//! calls produce identical zones and the loading UI behaves the same across
//! runs.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

use crate::geo::{LatLon, square_ring};
use crate::prediction::{DailyForecast, Forecast};
use crate::zone::{HeatZone, Severity, ZoneProperties};

struct ZoneSeed {
    id: &'static str,
    name: &'static str,
    center: LatLon,
    half_span: f64,
    base_probability: f64,
}

const fn seed(
    id: &'static str,
    name: &'static str,
    lat: f64,
    lon: f64,
    half_span: f64,
    base_probability: f64,
) -> ZoneSeed {
    ZoneSeed {
        id,
        name,
        center: LatLon { lat, lon },
        half_span,
        base_probability,
    }
}

/// Two metro regions: Bangkok and Chiang Mai.
const SEEDS: [ZoneSeed; 9] = [
    seed("mock-bkk-pathum-wan", "Pathum Wan, Bangkok", 13.7466, 100.5347, 0.025, 0.78),
    seed("mock-bkk-bang-rak", "Bang Rak, Bangkok", 13.7262, 100.5234, 0.02, 0.66),
    seed("mock-bkk-chatuchak", "Chatuchak, Bangkok", 13.8282, 100.5598, 0.03, 0.55),
    seed("mock-bkk-lat-krabang", "Lat Krabang, Bangkok", 13.7225, 100.7592, 0.04, 0.42),
    seed("mock-bkk-thon-buri", "Thon Buri, Bangkok", 13.7246, 100.4870, 0.025, 0.61),
    seed("mock-cnx-old-city", "Old City, Chiang Mai", 18.7883, 98.9853, 0.015, 0.58),
    seed("mock-cnx-nimman", "Nimmanhaemin, Chiang Mai", 18.7964, 98.9680, 0.012, 0.47),
    seed("mock-cnx-san-kamphaeng", "San Kamphaeng, Chiang Mai", 18.7450, 99.1203, 0.04, 0.33),
    seed("mock-cnx-hang-dong", "Hang Dong, Chiang Mai", 18.6870, 98.9170, 0.035, 0.24),
];

/// Number of zones in the mock constellation.
pub const MOCK_ZONE_COUNT: usize = SEEDS.len();

const PROBABILITY_FLOOR: f64 = 0.02;
const PROBABILITY_CEIL: f64 = 0.98;

/// Day-dependent perturbation applied to every seed probability.
fn day_perturbation(day_offset: u32, index: usize) -> f64 {
    0.12 * (f64::from(day_offset) * 1.1 + index as f64 * 0.9).sin()
}

fn mock_temperature(probability: f64) -> f64 {
    ((28.0 + probability * 16.0) * 10.0).round() / 10.0
}

fn issued_at(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default())
        .and_utc()
}

/// Generate the mock zone set for `date` shifted by `day_offset` days.
///
/// Severity is always re-derived from the perturbed probability.
pub fn mock_zones(date: NaiveDate, day_offset: u32) -> Vec<HeatZone> {
    let last_update = issued_at(date);
    let confidence = (0.92 - 0.03 * f64::from(day_offset)).clamp(0.5, 0.95);

    SEEDS
        .iter()
        .enumerate()
        .filter_map(|(index, seed)| {
            let probability = (seed.base_probability + day_perturbation(day_offset, index))
                .clamp(PROBABILITY_FLOOR, PROBABILITY_CEIL);
            let properties = ZoneProperties {
                name: seed.name.to_string(),
                probability,
                severity: Severity::from_probability(probability),
                temperature: mock_temperature(probability),
                confidence,
                last_update,
            };
            match HeatZone::new(seed.id, square_ring(seed.center, seed.half_span), properties) {
                Ok(zone) => Some(zone),
                Err(err) => {
                    tracing::error!(zone = seed.id, "mock seed has invalid geometry: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Generate `days` sequential daily records starting at `start`.
///
/// Probability climbs every day with a small deterministic wobble that never
/// outweighs the daily step, so the series is non-decreasing.
pub fn mock_forecast(start: NaiveDate, days: u32) -> Forecast {
    let days = (0..days)
        .filter_map(|offset| {
            let date = start.checked_add_days(Days::new(u64::from(offset)))?;
            let step = f64::from(offset);
            let probability = (0.35 + 0.05 * step + 0.015 * (step * 2.3).sin())
                .clamp(PROBABILITY_FLOOR, PROBABILITY_CEIL);
            Some(DailyForecast {
                date,
                day_offset: offset,
                probability,
                severity: Severity::from_probability(probability),
                temperature: mock_temperature(probability),
            })
        })
        .collect();
    Forecast { days }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
    }

    #[test]
    fn constellation_has_nine_zones_in_two_regions() {
        let zones = mock_zones(date(), 0);
        assert_eq!(zones.len(), MOCK_ZONE_COUNT);
        let bangkok = zones
            .iter()
            .filter(|z| z.properties().name.ends_with("Bangkok"))
            .count();
        let chiang_mai = zones
            .iter()
            .filter(|z| z.properties().name.ends_with("Chiang Mai"))
            .count();
        assert_eq!(bangkok + chiang_mai, MOCK_ZONE_COUNT);
        assert!(bangkok > 0 && chiang_mai > 0);
    }

    #[test]
    fn severity_always_follows_probability() {
        for day in 0..30 {
            for zone in mock_zones(date(), day) {
                let props = zone.properties();
                assert_eq!(props.severity, Severity::from_probability(props.probability));
                assert!((0.0..=1.0).contains(&props.probability));
            }
        }
    }

    #[test]
    fn output_is_deterministic_per_day() {
        assert_eq!(mock_zones(date(), 3), mock_zones(date(), 3));
        let day0: Vec<f64> = mock_zones(date(), 0)
            .iter()
            .map(|z| z.properties().probability)
            .collect();
        let day1: Vec<f64> = mock_zones(date(), 1)
            .iter()
            .map(|z| z.properties().probability)
            .collect();
        assert_ne!(day0, day1);
    }

    #[test]
    fn every_mock_ring_is_closed() {
        for zone in mock_zones(date(), 0) {
            let ring = zone.ring();
            assert!(ring.len() >= 4);
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn forecast_is_sequential_and_non_decreasing() {
        let forecast = mock_forecast(date(), 14);
        assert_eq!(forecast.len(), 14);
        for pair in forecast.days.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
            assert_eq!(pair[1].day_offset, pair[0].day_offset + 1);
            assert!(pair[1].probability >= pair[0].probability);
        }
        for day in &forecast.days {
            assert_eq!(day.severity, Severity::from_probability(day.probability));
        }
    }

    #[test]
    fn empty_forecast() {
        assert!(mock_forecast(date(), 0).is_empty());
    }
}

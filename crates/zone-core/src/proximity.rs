//! Narrow a zone collection to what is near the user and pick the closest.

use tracing::{debug, warn};

use crate::geo::degree_distance;
use crate::zone::{HeatZone, UserLocation};

/// Default proximity radius in degrees (roughly 165 km at the equator).
pub const DEFAULT_RADIUS_DEG: f64 = 1.5;
/// Zones kept when nothing lies within the radius.
pub const FALLBACK_ZONE_LIMIT: usize = 50;

/// Degree distance from `location` to the zone's vertex-mean centre.
///
/// Zones whose geometry cannot produce a centre yield `None` and are skipped
/// by callers rather than aborting the whole pass.
fn zone_distance(zone: &HeatZone, location: &UserLocation) -> Option<f64> {
    match zone.center() {
        Ok(center) => Some(degree_distance(
            location.latitude,
            location.longitude,
            center.lat,
            center.lon,
        )),
        Err(err) => {
            warn!(zone = zone.id(), "skipping zone with invalid geometry: {err}");
            None
        }
    }
}

/// Keep zones whose centre lies within `radius_deg` of the user.
///
/// Without a location, or with no zones, the input passes through untouched.
/// When the user is far from every zone the first [`FALLBACK_ZONE_LIMIT`]
/// zones are returned instead of an empty list so the map never goes blank.
pub fn filter_nearby(
    zones: &[HeatZone],
    location: Option<&UserLocation>,
    radius_deg: f64,
) -> Vec<HeatZone> {
    let Some(location) = location else {
        return zones.to_vec();
    };
    if zones.is_empty() {
        return Vec::new();
    }

    let nearby: Vec<HeatZone> = zones
        .iter()
        .filter(|zone| zone_distance(zone, location).is_some_and(|d| d <= radius_deg))
        .cloned()
        .collect();

    if nearby.is_empty() {
        debug!(
            total = zones.len(),
            radius_deg, "no zones within radius, falling back to leading zones"
        );
        return zones.iter().take(FALLBACK_ZONE_LIMIT).cloned().collect();
    }

    debug!(kept = nearby.len(), total = zones.len(), radius_deg, "filtered nearby zones");
    nearby
}

/// Zone whose centre is closest to the user; first one wins on ties.
pub fn select_closest<'a>(
    zones: &'a [HeatZone],
    location: Option<&UserLocation>,
) -> Option<&'a HeatZone> {
    let location = location?;
    let mut best: Option<(&HeatZone, f64)> = None;
    for zone in zones {
        let Some(distance) = zone_distance(zone, location) else {
            continue;
        };
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((zone, distance)),
        }
    }
    best.map(|(zone, _)| zone)
}

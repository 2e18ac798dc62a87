//! Degree-space geometry used for proximity decisions.
//!
//! Everything here works directly on (latitude, longitude) degrees. That is
//! cheap and good enough at city scale, but it is not a great-circle metric:
//! results drift near the poles and become meaningless at country scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Polygon vertex stored in GeoJSON order: `[longitude, latitude]`.
pub type Position = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// A latitude/longitude pair in degrees.
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("polygon ring has no vertices")]
    EmptyRing,
    #[error("polygon ring needs at least 4 vertices, got {count}")]
    TooFewPoints { count: usize },
    #[error("polygon ring is not closed (first vertex differs from last)")]
    OpenRing,
}

/// Euclidean distance in degree space: `sqrt(dlat^2 + dlon^2)`.
pub fn degree_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Arithmetic mean of every vertex in `ring`.
///
/// The closing vertex is counted twice, so the first corner carries double
/// weight. This is kept as-is for compatibility with the upstream naming and
/// proximity behaviour. A true area-weighted centroid would differ for
/// irregular or non-convex polygons; it is unclear whether the bias was
/// intended upstream.
pub fn polygon_center(ring: &[Position]) -> Result<LatLon, GeometryError> {
    if ring.is_empty() {
        return Err(GeometryError::EmptyRing);
    }

    let (lon_sum, lat_sum) = ring
        .iter()
        .fold((0.0, 0.0), |(lon, lat), [x, y]| (lon + x, lat + y));
    let count = ring.len() as f64;
    Ok(LatLon {
        lat: lat_sum / count,
        lon: lon_sum / count,
    })
}

/// Check the ring invariant held by every `HeatZone`: closed, 4+ vertices.
pub fn validate_ring(ring: &[Position]) -> Result<(), GeometryError> {
    match ring {
        [] => Err(GeometryError::EmptyRing),
        _ if ring.len() < 4 => Err(GeometryError::TooFewPoints { count: ring.len() }),
        [first, .., last] if first != last => Err(GeometryError::OpenRing),
        _ => Ok(()),
    }
}

/// Closed axis-aligned square of `half_span` degrees around a centre.
pub fn square_ring(center: LatLon, half_span: f64) -> Vec<Position> {
    let (lat, lon) = (center.lat, center.lon);
    vec![
        [lon - half_span, lat - half_span],
        [lon + half_span, lat - half_span],
        [lon + half_span, lat + half_span],
        [lon - half_span, lat + half_span],
        [lon - half_span, lat - half_span],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_zero_for_identical_points() {
        for (lat, lon) in [(0.0, 0.0), (13.75, 100.5), (-33.9, 151.2), (89.9, -179.9)] {
            assert_eq!(degree_distance(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let a = degree_distance(13.75, 100.50, 18.79, 98.98);
        let b = degree_distance(18.79, 98.98, 13.75, 100.50);
        assert_eq!(a, b);
    }

    #[test]
    fn distance_matches_pythagoras_in_degrees() {
        assert!((degree_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn center_counts_closing_vertex_twice() {
        let ring = vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]];
        let center = polygon_center(&ring).unwrap();
        // (0 + 4 + 4 + 0 + 0) / 5 on both axes; a true centroid would be 2.0
        assert!((center.lon - 1.6).abs() < 1e-12);
        assert!((center.lat - 1.6).abs() < 1e-12);
    }

    #[test]
    fn center_of_empty_ring_is_invalid() {
        assert_eq!(polygon_center(&[]), Err(GeometryError::EmptyRing));
    }

    #[test]
    fn ring_validation() {
        let square = square_ring(LatLon { lat: 10.0, lon: 20.0 }, 0.5);
        assert_eq!(validate_ring(&square), Ok(()));
        assert_eq!(
            validate_ring(&square[..3]),
            Err(GeometryError::TooFewPoints { count: 3 })
        );
        assert_eq!(validate_ring(&square[..4]), Err(GeometryError::OpenRing));
        assert_eq!(validate_ring(&[]), Err(GeometryError::EmptyRing));
    }
}

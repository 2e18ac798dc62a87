//! Pure heat-risk zone model: degree-space geometry, severity rules, mock
//! data and proximity filtering. Nothing here touches the network.

pub mod geo;
pub mod mock;
pub mod prediction;
pub mod proximity;
pub mod risk;
pub mod zone;

pub use geo::{GeometryError, LatLon, Position, degree_distance, polygon_center};
pub use prediction::{DailyForecast, Forecast, PredictionSummary};
pub use proximity::{DEFAULT_RADIUS_DEG, FALLBACK_ZONE_LIMIT, filter_nearby, select_closest};
pub use risk::temperature_to_probability;
pub use zone::{HeatZone, Region, Severity, UserLocation, ZoneProperties};

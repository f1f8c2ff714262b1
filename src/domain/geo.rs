use crate::error::MarketError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres, used by the great-circle formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A resolved geographic position.
///
/// Ephemeral by design: coordinates are re-resolved from a profile's free-text
/// location per search and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoordinate {
    /// Builds a coordinate, rejecting values outside the valid ranges
    /// (`lat ∈ [-90, 90]`, `lng ∈ [-180, 180]`).
    pub fn new(lat: f64, lng: f64) -> Result<Self, MarketError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(MarketError::Validation(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(MarketError::Validation(format!(
                "longitude {lng} out of range [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance between two coordinates in kilometres (haversine).
pub fn distance_km(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Rounds a distance to the single decimal carried by search results.
pub fn round_km(distance: f64) -> f64 {
    (distance * 10.0).round() / 10.0
}

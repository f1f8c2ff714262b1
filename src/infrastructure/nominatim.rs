use crate::domain::geo::GeoCoordinate;
use crate::domain::ports::Geocoder;
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Public Nominatim endpoint used when no override is configured.
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);
/// The search always asks for a single best match.
const RESULT_LIMIT: &str = "1";

#[derive(Debug, Clone, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Location-search adapter backed by Nominatim.
///
/// The upstream is treated as unreliable: request errors, non-success
/// statuses, empty result lists and unparseable coordinates all resolve to
/// `Ok(None)` so a search never fails on a geocoding hiccup.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self> {
        Self::with_config(NOMINATIM_BASE_URL.into())
    }

    pub fn with_config(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("promarket/", env!("CARGO_PKG_VERSION")))
            .timeout(GEOCODE_TIMEOUT)
            .build()
            .map_err(|err| MarketError::Internal(Box::new(err)))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, query: &str) -> Result<Option<GeoCoordinate>> {
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("format", "json"), ("limit", RESULT_LIMIT)]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("geocoding request for '{query}' failed: {err}");
                return Ok(None);
            }
        };
        if !response.status().is_success() {
            warn!(
                "geocoding for '{query}' returned status {}",
                response.status()
            );
            return Ok(None);
        }
        let places: Vec<NominatimPlace> = match response.json().await {
            Ok(places) => places,
            Err(err) => {
                warn!("unparseable geocoding response for '{query}': {err}");
                return Ok(None);
            }
        };

        Ok(places.first().and_then(parse_place))
    }
}

fn parse_place(place: &NominatimPlace) -> Option<GeoCoordinate> {
    let lat: f64 = place.lat.parse().ok()?;
    let lng: f64 = place.lon.parse().ok()?;
    GeoCoordinate::new(lat, lng).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let body = r#"[{"place_id": 1, "lat": "38.7077507", "lon": "-9.1365919", "display_name": "Lisboa, Portugal"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).unwrap();
        let place = parse_place(&places[0]).unwrap();
        assert!((place.lat - 38.7077507).abs() < 1e-9);
        assert!((place.lng + 9.1365919).abs() < 1e-9);
    }

    #[test]
    fn test_unparseable_or_out_of_range_coordinates_resolve_to_none() {
        let garbled = NominatimPlace {
            lat: "not-a-number".into(),
            lon: "0.0".into(),
        };
        assert!(parse_place(&garbled).is_none());

        let out_of_range = NominatimPlace {
            lat: "91.0".into(),
            lon: "0.0".into(),
        };
        assert!(parse_place(&out_of_range).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service_degrades_to_unresolved() {
        // Port 9 (discard) refuses connections immediately.
        let geocoder = NominatimGeocoder::with_config("http://127.0.0.1:9".into()).unwrap();
        let resolved = geocoder.resolve("Lisboa").await.unwrap();
        assert!(resolved.is_none());
    }
}

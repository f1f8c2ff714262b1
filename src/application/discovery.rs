use crate::domain::geo::{self, GeoCoordinate};
use crate::domain::ports::{Geocoder, GeocoderArc, ProfileStoreBox};
use crate::domain::profile::{PageRequest, ProfileHit, ProfileQuery, SearchFilters, SortOptions};
use crate::error::{MarketError, Result};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// Fixed spacing between calls in the offline batch geocoding path. The
/// upstream service allows one request per second.
pub const BATCH_GEOCODE_DELAY: Duration = Duration::from_secs(1);

/// Near-me search parameters. Presence of this value requests geo mode.
#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
}

/// A complete search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub filters: SearchFilters,
    pub page: PageRequest,
    pub sort: SortOptions,
    pub geo: Option<GeoFilter>,
}

/// A profile view augmented with resolution and ranking data.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub profile_id: Uuid,
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub location: String,
    pub rating: f64,
    pub available: bool,
    pub coordinates: Option<GeoCoordinate>,
    /// Kilometres from the search origin, one decimal. Absent outside geo
    /// mode or when the location did not resolve.
    pub distance_km: Option<f64>,
}

impl SearchResult {
    fn from_hit(hit: ProfileHit) -> Self {
        Self {
            profile_id: hit.profile.id,
            user_id: hit.profile.user_id,
            display_name: hit.user.map(|user| user.display_name),
            location: hit.profile.location,
            rating: hit.profile.rating,
            available: hit.profile.available,
            coordinates: None,
            distance_km: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub page_info: PageInfo,
}

/// Geo-ranked discovery over professional profiles.
///
/// The base query (filter, sort, paginate) runs at the store; geo mode then
/// resolves and ranks the fetched page only. Filtering by distance across the
/// full candidate set would geocode every match on every request, so the
/// bounded per-page cost is accepted and the post-filter page metadata
/// reflects the surviving subset.
pub struct DiscoveryEngine {
    profiles: ProfileStoreBox,
    geocoder: GeocoderArc,
}

impl DiscoveryEngine {
    pub fn new(profiles: ProfileStoreBox, geocoder: GeocoderArc) -> Self {
        Self { profiles, geocoder }
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let query = ProfileQuery {
            filters: request.filters,
            sort: request.sort,
            page: request.page,
        };
        let page = self.profiles.search_profiles(&query).await?;

        match request.geo {
            None => {
                let page_info = PageInfo {
                    page: request.page.page(),
                    limit: request.page.limit(),
                    total_items: page.total_items,
                    total_pages: page.total_items.div_ceil(u64::from(request.page.limit())),
                };
                let results = page.hits.into_iter().map(SearchResult::from_hit).collect();
                Ok(SearchResponse { results, page_info })
            }
            Some(near) => self.rank_by_distance(page.hits, near, request.page).await,
        }
    }

    /// Resolves one profile's stored location on demand. Deleted profiles
    /// look exactly like missing ones; an empty location never resolves.
    pub async fn resolve_profile_coordinates(
        &self,
        profile_id: Uuid,
    ) -> Result<Option<GeoCoordinate>> {
        let profile = self
            .profiles
            .get_profile(profile_id)
            .await?
            .filter(|profile| !profile.deleted)
            .ok_or_else(|| MarketError::NotFound("profile not found".into()))?;
        if profile.location.is_empty() {
            return Ok(None);
        }
        Ok(resolve_or_none(&*self.geocoder, &profile.location).await)
    }

    /// Resolves coordinates for one page of hits and keeps only profiles
    /// within the radius, closest first.
    async fn rank_by_distance(
        &self,
        hits: Vec<ProfileHit>,
        near: GeoFilter,
        page: PageRequest,
    ) -> Result<SearchResponse> {
        let origin = GeoCoordinate::new(near.lat, near.lng)?;

        // Per-page lookups are independent and fan out concurrently; each
        // failure degrades that profile to unresolved.
        let mut join_set = JoinSet::new();
        for (index, hit) in hits.iter().enumerate() {
            if hit.profile.location.is_empty() {
                continue;
            }
            let geocoder = Arc::clone(&self.geocoder);
            let location = hit.profile.location.clone();
            join_set.spawn(async move { (index, resolve_or_none(&*geocoder, &location).await) });
        }
        let mut coordinates: Vec<Option<GeoCoordinate>> = vec![None; hits.len()];
        while let Some(joined) = join_set.join_next().await {
            if let Ok((index, resolved)) = joined {
                coordinates[index] = resolved;
            }
        }

        let mut results: Vec<SearchResult> = hits
            .into_iter()
            .zip(coordinates)
            .map(|(hit, resolved)| {
                let mut result = SearchResult::from_hit(hit);
                result.coordinates = resolved;
                result.distance_km = resolved.map(|point| geo::round_km(geo::distance_km(origin, point)));
                result
            })
            .collect();

        results.retain(|result| matches!(result.distance_km, Some(d) if d <= near.radius_km));
        results.sort_by(|a, b| match (a.distance_km, b.distance_km) {
            (Some(left), Some(right)) => left.total_cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        debug!(
            "near-me search kept {} of page within {} km",
            results.len(),
            near.radius_km
        );

        // Page metadata reflects the post-filter subset, not the base count.
        let total_items = results.len() as u64;
        let page_info = PageInfo {
            page: page.page(),
            limit: page.limit(),
            total_items,
            total_pages: total_items.div_ceil(u64::from(page.limit())),
        };
        Ok(SearchResponse { results, page_info })
    }
}

async fn resolve_or_none(geocoder: &dyn Geocoder, location: &str) -> Option<GeoCoordinate> {
    match geocoder.resolve(location).await {
        Ok(resolved) => resolved,
        Err(err) => {
            warn!("geocoding '{location}' failed: {err}");
            None
        }
    }
}

/// Resolves a list of free-text locations strictly sequentially, one call per
/// second. Offline/background use only; the request path never goes through
/// here.
pub async fn geocode_batch(
    geocoder: &dyn Geocoder,
    locations: &[String],
) -> Vec<Option<GeoCoordinate>> {
    let mut resolved = Vec::with_capacity(locations.len());
    for (index, location) in locations.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(BATCH_GEOCODE_DELAY).await;
        }
        resolved.push(resolve_or_none(geocoder, location).await);
    }
    resolved
}

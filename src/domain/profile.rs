use crate::error::{MarketError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The searchable identity of the user owning a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub display_name: String,
    pub handle: String,
}

/// A professional's marketplace profile.
///
/// At most one profile exists per user (store-enforced). Profiles are only
/// ever soft-deleted: bookings keep referencing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Free-text location, geocoded on demand. May be empty.
    pub location: String,
    pub rating: f64,
    pub available: bool,
    pub active: bool,
    pub deleted: bool,
    pub category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ProfessionalProfile {
    pub fn new(user_id: Uuid, location: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            location: location.into(),
            rating: 0.0,
            available: true,
            active: true,
            deleted: false,
            category_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Filters applied to the profile base query.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Substring match on the owning user's display name or handle
    /// (case-insensitive). Makes the user join mandatory when present.
    pub name: Option<String>,
    /// Case-insensitive substring match on the profile location.
    pub location: Option<String>,
    pub min_rating: Option<f64>,
    /// Category membership filter; an empty list means no filtering.
    pub category_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Rating,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Result<Self> {
        if page == 0 {
            return Err(MarketError::Validation("page must be at least 1".into()));
        }
        if limit == 0 {
            return Err(MarketError::Validation("limit must be positive".into()));
        }
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> usize {
        ((u64::from(self.page) - 1) * u64::from(self.limit)) as usize
    }
}

/// A profile joined with its owning user, as returned by the base query.
///
/// The user side is optional: the join only becomes mandatory when a name
/// filter is present.
#[derive(Debug, Clone)]
pub struct ProfileHit {
    pub profile: ProfessionalProfile,
    pub user: Option<UserRecord>,
}

/// One page of the base query plus the pre-pagination match count.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub hits: Vec<ProfileHit>,
    pub total_items: u64,
}

/// The complete base query: filters, sort and pagination.
///
/// `apply` holds the filter semantics in one place so every store adapter
/// paginates identically.
#[derive(Debug, Clone)]
pub struct ProfileQuery {
    pub filters: SearchFilters,
    pub sort: SortOptions,
    pub page: PageRequest,
}

impl ProfileQuery {
    pub fn apply(&self, rows: Vec<ProfileHit>) -> ProfilePage {
        let name_needle = self.filters.name.as_deref().map(str::to_lowercase);
        let location_needle = self.filters.location.as_deref().map(str::to_lowercase);

        let mut hits: Vec<ProfileHit> = rows
            .into_iter()
            .filter(|hit| self.matches(hit, name_needle.as_deref(), location_needle.as_deref()))
            .collect();

        hits.sort_by(|a, b| {
            let ordering = match self.sort.field {
                SortField::Rating => a.profile.rating.total_cmp(&b.profile.rating),
                SortField::CreatedAt => a.profile.created_at.cmp(&b.profile.created_at),
            };
            let ordering = match self.sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            // Stable tie-break so pagination never straddles duplicates.
            ordering.then_with(|| a.profile.id.cmp(&b.profile.id))
        });

        let total_items = hits.len() as u64;
        let hits = hits
            .into_iter()
            .skip(self.page.offset())
            .take(self.page.limit() as usize)
            .collect();

        ProfilePage { hits, total_items }
    }

    fn matches(
        &self,
        hit: &ProfileHit,
        name_needle: Option<&str>,
        location_needle: Option<&str>,
    ) -> bool {
        let profile = &hit.profile;
        if !profile.active || profile.deleted {
            return false;
        }
        if let Some(needle) = location_needle {
            if !profile.location.to_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(min) = self.filters.min_rating {
            if profile.rating < min {
                return false;
            }
        }
        if !self.filters.category_ids.is_empty()
            && !self
                .filters
                .category_ids
                .iter()
                .any(|id| profile.category_ids.contains(id))
        {
            return false;
        }
        if let Some(needle) = name_needle {
            // Name filter makes the user join mandatory.
            let Some(user) = &hit.user else {
                return false;
            };
            if !user.display_name.to_lowercase().contains(needle)
                && !user.handle.to_lowercase().contains(needle)
            {
                return false;
            }
        }
        true
    }
}

use crate::domain::booking::{Booking, PaymentProgress, StatusUpdate};
use crate::domain::geo::GeoCoordinate;
use crate::domain::payment::BookingPayment;
use crate::domain::profile::{ProfessionalProfile, ProfilePage, ProfileQuery, UserRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type ProfileStoreBox = Box<dyn ProfileStore>;
pub type BookingStoreBox = Box<dyn BookingStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type GeocoderArc = Arc<dyn Geocoder>;
pub type MetricsHooksArc = Arc<dyn MetricsHooks>;

pub type ProfileStoreFactory = Box<dyn Fn() -> ProfileStoreBox + Send + Sync>;
pub type BookingStoreFactory = Box<dyn Fn() -> BookingStoreBox + Send + Sync>;
pub type PaymentStoreFactory = Box<dyn Fn() -> PaymentStoreBox + Send + Sync>;

/// Storage for users and professional profiles.
///
/// `put_profile` enforces the one-profile-per-user invariant; profiles are
/// soft-deleted only.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn put_user(&self, user: UserRecord) -> Result<()>;
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>>;
    async fn put_profile(&self, profile: ProfessionalProfile) -> Result<()>;
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfessionalProfile>>;
    /// Runs the base query: filter, sort, count, paginate.
    async fn search_profiles(&self, query: &ProfileQuery) -> Result<ProfilePage>;
    /// Marks a profile deleted. Returns whether it existed.
    async fn soft_delete_profile(&self, profile_id: Uuid) -> Result<bool>;
}

/// Storage for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn put(&self, booking: Booking) -> Result<()>;
    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>>;
    /// Single conditional update keyed by `(booking_id, professional_id)`.
    ///
    /// This is the mutual-exclusion boundary for racing status updates:
    /// adapters must apply it atomically, not as an unguarded
    /// read-modify-write. Returns `None` when no booking matches both keys.
    async fn update_status(
        &self,
        booking_id: Uuid,
        professional_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<Booking>>;
    /// Advances the booking's payment progress; progress never moves
    /// backwards. Returns `None` when the booking is absent.
    async fn set_payment_progress(
        &self,
        booking_id: Uuid,
        progress: PaymentProgress,
    ) -> Result<Option<Booking>>;
    async fn list_for_professional(&self, professional_id: Uuid) -> Result<Vec<Booking>>;
}

/// Storage for split-payment records.
///
/// `put` enforces uniqueness of the external payment-intent id.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn put(&self, payment: BookingPayment) -> Result<()>;
    async fn get(&self, payment_id: Uuid) -> Result<Option<BookingPayment>>;
    async fn get_by_intent(&self, payment_intent_id: &str) -> Result<Option<BookingPayment>>;
    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<BookingPayment>>;
}

/// Outbound boundary to the third-party location-search service.
///
/// Unreliable by contract: adapters resolve failures, non-success responses
/// and empty result lists to `Ok(None)` rather than erroring past the
/// boundary.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Option<GeoCoordinate>>;
}

/// Outbound notification port for terminal booking transitions.
///
/// Fire-and-forget: callers log failures and never let them roll back a
/// committed status change.
#[async_trait]
pub trait MetricsHooks: Send + Sync {
    async fn on_booking_completed(&self, professional_id: Uuid) -> Result<()>;
    async fn on_booking_cancelled(&self, professional_id: Uuid) -> Result<()>;
}

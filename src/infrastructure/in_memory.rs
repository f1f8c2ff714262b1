use crate::domain::booking::{Booking, PaymentProgress, StatusUpdate};
use crate::domain::payment::BookingPayment;
use crate::domain::ports::{BookingStore, PaymentStore, ProfileStore};
use crate::domain::profile::{
    ProfessionalProfile, ProfileHit, ProfilePage, ProfileQuery, UserRecord,
};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Users and profiles behind one lock, so the one-profile-per-user check and
/// the insert are a single critical section.
#[derive(Default)]
struct ProfileState {
    users: HashMap<Uuid, UserRecord>,
    profiles: HashMap<Uuid, ProfessionalProfile>,
}

/// A thread-safe in-memory store for users and professional profiles.
///
/// Ideal for testing or small datasets where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryProfileStore {
    state: Arc<RwLock<ProfileState>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn put_user(&self, user: UserRecord) -> Result<()> {
        let mut state = self.state.write().await;
        state.users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn put_profile(&self, profile: ProfessionalProfile) -> Result<()> {
        let mut state = self.state.write().await;
        let taken = state
            .profiles
            .values()
            .any(|existing| existing.user_id == profile.user_id && existing.id != profile.id);
        if taken {
            return Err(MarketError::Validation(format!(
                "user {} already has a profile",
                profile.user_id
            )));
        }
        state.profiles.insert(profile.id, profile);
        Ok(())
    }

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfessionalProfile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&profile_id).cloned())
    }

    async fn search_profiles(&self, query: &ProfileQuery) -> Result<ProfilePage> {
        let state = self.state.read().await;
        let rows = state
            .profiles
            .values()
            .cloned()
            .map(|profile| ProfileHit {
                user: state.users.get(&profile.user_id).cloned(),
                profile,
            })
            .collect();
        Ok(query.apply(rows))
    }

    async fn soft_delete_profile(&self, profile_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.profiles.get_mut(&profile_id) {
            Some(profile) => {
                profile.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A thread-safe in-memory store for bookings.
///
/// The conditional status update runs under the write lock, which makes it
/// the atomic compare-keys-and-write the booking lifecycle relies on.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn put(&self, booking: Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&booking_id).cloned())
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        professional_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking_id) {
            Some(booking) if booking.professional_id == professional_id => {
                booking.status = update.status;
                booking.status_updated_at = update.status_updated_at;
                if booking.completion_date.is_none() {
                    booking.completion_date = update.completion_date;
                }
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_payment_progress(
        &self,
        booking_id: Uuid,
        progress: PaymentProgress,
    ) -> Result<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking_id) {
            Some(booking) => {
                if progress.rank() > booking.payment_status.rank() {
                    booking.payment_status = progress;
                }
                Ok(Some(booking.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_for_professional(&self, professional_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings
            .values()
            .filter(|booking| booking.professional_id == professional_id)
            .cloned()
            .collect())
    }
}

/// Payments and the intent index behind one lock, so intent uniqueness holds
/// under interleaved webhook deliveries.
#[derive(Default)]
struct PaymentState {
    payments: HashMap<Uuid, BookingPayment>,
    by_intent: HashMap<String, Uuid>,
}

/// A thread-safe in-memory store for split-payment records.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    state: Arc<RwLock<PaymentState>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn put(&self, payment: BookingPayment) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.by_intent.get(&payment.payment_intent_id) {
            if *existing != payment.id {
                return Err(MarketError::Validation(format!(
                    "payment intent '{}' is already registered",
                    payment.payment_intent_id
                )));
            }
        }
        state
            .by_intent
            .insert(payment.payment_intent_id.clone(), payment.id);
        state.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, payment_id: Uuid) -> Result<Option<BookingPayment>> {
        let state = self.state.read().await;
        Ok(state.payments.get(&payment_id).cloned())
    }

    async fn get_by_intent(&self, payment_intent_id: &str) -> Result<Option<BookingPayment>> {
        let state = self.state.read().await;
        Ok(state
            .by_intent
            .get(payment_intent_id)
            .and_then(|id| state.payments.get(id))
            .cloned())
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<BookingPayment>> {
        let state = self.state.read().await;
        let mut payments: Vec<BookingPayment> = state
            .payments
            .values()
            .filter(|payment| payment.booking_id == booking_id)
            .cloned()
            .collect();
        payments.sort_by_key(|payment| payment.payment_type);
        Ok(payments)
    }
}

use crate::domain::booking::{Booking, PaymentProgress, StatusUpdate};
use crate::domain::payment::BookingPayment;
use crate::domain::ports::{BookingStore, PaymentStore, ProfileStore};
use crate::domain::profile::{
    ProfessionalProfile, ProfileHit, ProfilePage, ProfileQuery, UserRecord,
};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for user records.
pub const CF_USERS: &str = "users";
/// Column Family for professional profiles.
pub const CF_PROFILES: &str = "profiles";
/// Column Family mapping a user id to their profile id.
pub const CF_PROFILE_OWNERS: &str = "profile_owners";
/// Column Family for bookings.
pub const CF_BOOKINGS: &str = "bookings";
/// Column Family for split-payment records.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family mapping an external payment-intent id to its payment id.
pub const CF_PAYMENT_INTENTS: &str = "payment_intents";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for users, profiles, bookings and payments in separate
/// Column Families, with JSON values keyed by entity id. The two index
/// families keep the one-profile-per-user and unique-payment-intent checks
/// to a point lookup.
///
/// Conditional mutations (the booking status update, the payment-intent
/// uniqueness check) run their read-check-write sequence behind one gate, so
/// interleaved requests cannot split the check from the write.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [
            CF_USERS,
            CF_PROFILES,
            CF_PROFILE_OWNERS,
            CF_BOOKINGS,
            CF_PAYMENTS,
            CF_PAYMENT_INTENTS,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
        .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            MarketError::Internal(Box::new(std::io::Error::other(format!(
                "column family '{name}' not found"
            ))))
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn scan_json<T: serde::de::DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn uuid_from_bytes(bytes: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(bytes).map_err(|err| MarketError::Internal(Box::new(err)))
}

#[async_trait]
impl ProfileStore for RocksDbStore {
    async fn put_user(&self, user: UserRecord) -> Result<()> {
        self.put_json(CF_USERS, user.id.as_bytes(), &user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        self.get_json(CF_USERS, user_id.as_bytes())
    }

    async fn put_profile(&self, profile: ProfessionalProfile) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let owners = self.cf(CF_PROFILE_OWNERS)?;
        if let Some(existing) = self.db.get_cf(owners, profile.user_id.as_bytes())? {
            if uuid_from_bytes(&existing)? != profile.id {
                return Err(MarketError::Validation(format!(
                    "user {} already has a profile",
                    profile.user_id
                )));
            }
        }
        self.db
            .put_cf(owners, profile.user_id.as_bytes(), profile.id.as_bytes())?;
        self.put_json(CF_PROFILES, profile.id.as_bytes(), &profile)
    }

    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<ProfessionalProfile>> {
        self.get_json(CF_PROFILES, profile_id.as_bytes())
    }

    async fn search_profiles(&self, query: &ProfileQuery) -> Result<ProfilePage> {
        let profiles: Vec<ProfessionalProfile> = self.scan_json(CF_PROFILES)?;
        let mut rows = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let user = self.get_json(CF_USERS, profile.user_id.as_bytes())?;
            rows.push(ProfileHit { profile, user });
        }
        Ok(query.apply(rows))
    }

    async fn soft_delete_profile(&self, profile_id: Uuid) -> Result<bool> {
        let _gate = self.write_gate.lock().await;
        match self.get_json::<ProfessionalProfile>(CF_PROFILES, profile_id.as_bytes())? {
            Some(mut profile) => {
                profile.deleted = true;
                self.put_json(CF_PROFILES, profile_id.as_bytes(), &profile)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BookingStore for RocksDbStore {
    async fn put(&self, booking: Booking) -> Result<()> {
        self.put_json(CF_BOOKINGS, booking.id.as_bytes(), &booking)
    }

    async fn get(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        self.get_json(CF_BOOKINGS, booking_id.as_bytes())
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        professional_id: Uuid,
        update: StatusUpdate,
    ) -> Result<Option<Booking>> {
        let _gate = self.write_gate.lock().await;
        match self.get_json::<Booking>(CF_BOOKINGS, booking_id.as_bytes())? {
            Some(mut booking) if booking.professional_id == professional_id => {
                booking.status = update.status;
                booking.status_updated_at = update.status_updated_at;
                if booking.completion_date.is_none() {
                    booking.completion_date = update.completion_date;
                }
                self.put_json(CF_BOOKINGS, booking_id.as_bytes(), &booking)?;
                Ok(Some(booking))
            }
            _ => Ok(None),
        }
    }

    async fn set_payment_progress(
        &self,
        booking_id: Uuid,
        progress: PaymentProgress,
    ) -> Result<Option<Booking>> {
        let _gate = self.write_gate.lock().await;
        match self.get_json::<Booking>(CF_BOOKINGS, booking_id.as_bytes())? {
            Some(mut booking) => {
                if progress.rank() > booking.payment_status.rank() {
                    booking.payment_status = progress;
                    self.put_json(CF_BOOKINGS, booking_id.as_bytes(), &booking)?;
                }
                Ok(Some(booking))
            }
            None => Ok(None),
        }
    }

    async fn list_for_professional(&self, professional_id: Uuid) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = self.scan_json(CF_BOOKINGS)?;
        Ok(bookings
            .into_iter()
            .filter(|booking| booking.professional_id == professional_id)
            .collect())
    }
}

#[async_trait]
impl PaymentStore for RocksDbStore {
    async fn put(&self, payment: BookingPayment) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let intents = self.cf(CF_PAYMENT_INTENTS)?;
        if let Some(existing) = self.db.get_cf(intents, payment.payment_intent_id.as_bytes())? {
            if uuid_from_bytes(&existing)? != payment.id {
                return Err(MarketError::Validation(format!(
                    "payment intent '{}' is already registered",
                    payment.payment_intent_id
                )));
            }
        }
        self.db.put_cf(
            intents,
            payment.payment_intent_id.as_bytes(),
            payment.id.as_bytes(),
        )?;
        self.put_json(CF_PAYMENTS, payment.id.as_bytes(), &payment)
    }

    async fn get(&self, payment_id: Uuid) -> Result<Option<BookingPayment>> {
        self.get_json(CF_PAYMENTS, payment_id.as_bytes())
    }

    async fn get_by_intent(&self, payment_intent_id: &str) -> Result<Option<BookingPayment>> {
        let intents = self.cf(CF_PAYMENT_INTENTS)?;
        match self.db.get_cf(intents, payment_intent_id.as_bytes())? {
            Some(bytes) => self.get_json(CF_PAYMENTS, uuid_from_bytes(&bytes)?.as_bytes()),
            None => Ok(None),
        }
    }

    async fn list_for_booking(&self, booking_id: Uuid) -> Result<Vec<BookingPayment>> {
        let payments: Vec<BookingPayment> = self.scan_json(CF_PAYMENTS)?;
        let mut payments: Vec<BookingPayment> = payments
            .into_iter()
            .filter(|payment| payment.booking_id == booking_id)
            .collect();
        payments.sort_by_key(|payment| payment.payment_type);
        Ok(payments)
    }
}

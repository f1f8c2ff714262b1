use crate::domain::booking::{Booking, BookingStats, BookingStatus, StatusUpdate};
use crate::domain::booking::PaymentProgress;
use crate::domain::payment::Money;
use crate::domain::ports::{BookingStoreBox, MetricsHooksArc};
use crate::error::{MarketError, Result};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Upcoming-bookings listings are capped at this many entries.
pub const UPCOMING_LIMIT: usize = 10;

/// Optional narrowing of a booking listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingScope {
    pub client_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
}

/// Owns the booking status state machine and the read-side queries.
///
/// Every operation takes the acting professional explicitly; there is no
/// ambient request identity. An ownership miss is indistinguishable from a
/// missing booking.
pub struct BookingLifecycle {
    bookings: BookingStoreBox,
    hooks: MetricsHooksArc,
}

impl BookingLifecycle {
    pub fn new(bookings: BookingStoreBox, hooks: MetricsHooksArc) -> Self {
        Self { bookings, hooks }
    }

    /// Registers a new booking (always starts out pending).
    pub async fn create_booking(&self, booking: Booking) -> Result<Booking> {
        self.bookings.put(booking.clone()).await?;
        debug!("created booking {} for professional {}", booking.id, booking.professional_id);
        Ok(booking)
    }

    /// Moves a booking to `new_status` on behalf of the acting professional.
    ///
    /// The write is a single conditional update keyed by booking and
    /// professional, so a concurrent reassignment between the ownership check
    /// and the write still cannot cross owners. Metrics hooks fire after the
    /// write commits; their failure is logged and swallowed.
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
        acting_professional_id: Uuid,
    ) -> Result<Booking> {
        if !new_status.is_requestable() {
            return Err(MarketError::InvalidStatus(format!(
                "'{new_status}' cannot be requested"
            )));
        }

        let current = self
            .bookings
            .get(booking_id)
            .await?
            .filter(|booking| booking.professional_id == acting_professional_id)
            .ok_or_else(|| MarketError::NotFound("booking not found".into()))?;

        if !current.status.can_transition_to(new_status) {
            return Err(MarketError::InvalidTransition(format!(
                "booking cannot move from '{}' to '{new_status}'",
                current.status
            )));
        }

        let update = StatusUpdate::at(new_status, Utc::now());
        let updated = self
            .bookings
            .update_status(booking_id, acting_professional_id, update)
            .await?
            .ok_or_else(|| MarketError::NotFound("booking not found".into()))?;

        match new_status {
            BookingStatus::Completed => {
                if let Err(err) = self.hooks.on_booking_completed(acting_professional_id).await {
                    warn!("booking-completed hook failed: {err}");
                }
            }
            BookingStatus::Cancelled => {
                if let Err(err) = self.hooks.on_booking_cancelled(acting_professional_id).await {
                    warn!("booking-cancelled hook failed: {err}");
                }
            }
            _ => {}
        }

        Ok(updated)
    }

    /// Lists a professional's bookings, most recent event first, optionally
    /// narrowed to a client or service.
    pub async fn list_bookings(
        &self,
        professional_id: Uuid,
        scope: &BookingScope,
    ) -> Result<Vec<Booking>> {
        let mut bookings = self.bookings.list_for_professional(professional_id).await?;
        if let Some(client_id) = scope.client_id {
            bookings.retain(|booking| booking.client_id == client_id);
        }
        if let Some(service_id) = scope.service_id {
            bookings.retain(|booking| booking.service_id == service_id);
        }
        bookings.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(bookings)
    }

    /// Fetches one booking. Bookings owned by other professionals look
    /// exactly like missing ones.
    pub async fn booking_detail(
        &self,
        booking_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Booking> {
        self.bookings
            .get(booking_id)
            .await?
            .filter(|booking| booking.professional_id == professional_id)
            .ok_or_else(|| MarketError::NotFound("booking not found".into()))
    }

    /// Per-status counts plus total earnings over completed, paid bookings.
    pub async fn stats(&self, professional_id: Uuid) -> Result<BookingStats> {
        let bookings = self.bookings.list_for_professional(professional_id).await?;
        let mut stats = BookingStats::default();
        for booking in &bookings {
            *stats.counts.entry(booking.status).or_insert(0) += 1;
            if booking.status == BookingStatus::Completed
                && booking.payment_status == PaymentProgress::Paid
            {
                stats.total_earnings += booking.total_amount;
            }
        }
        Ok(stats)
    }

    /// Confirmed or in-progress bookings with a future event date, soonest
    /// first, capped at [`UPCOMING_LIMIT`].
    pub async fn upcoming(&self, professional_id: Uuid) -> Result<Vec<Booking>> {
        let now = Utc::now();
        let mut bookings = self.bookings.list_for_professional(professional_id).await?;
        bookings.retain(|booking| {
            booking.event_date >= now
                && matches!(
                    booking.status,
                    BookingStatus::Confirmed | BookingStatus::InProgress
                )
        });
        bookings.sort_by(|a, b| a.event_date.cmp(&b.event_date));
        bookings.truncate(UPCOMING_LIMIT);
        Ok(bookings)
    }
}

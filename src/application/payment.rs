use crate::domain::booking::{Booking, PaymentProgress};
use crate::domain::payment::{BookingPayment, PaymentStatus, PaymentType};
use crate::domain::ports::{BookingStoreBox, PaymentStoreBox};
use crate::error::{MarketError, Result};
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

/// Records the split-payment state machine mirrored from the external
/// processor.
///
/// This component never drives the processor; it records the events the
/// processor delivers (at least once), keyed by payment-intent id.
pub struct PaymentLifecycle {
    payments: PaymentStoreBox,
    bookings: BookingStoreBox,
}

impl PaymentLifecycle {
    pub fn new(payments: PaymentStoreBox, bookings: BookingStoreBox) -> Self {
        Self { payments, bookings }
    }

    /// Creates the payment record for one installment of a booking.
    ///
    /// Amounts, platform fee and professional share are computed here, once,
    /// and never recomputed. One record per (booking, installment) pair.
    pub async fn register_intent(
        &self,
        booking: &Booking,
        payment_type: PaymentType,
        payment_intent_id: impl Into<String>,
    ) -> Result<BookingPayment> {
        let payment_intent_id = payment_intent_id.into();
        if self
            .payments
            .get_by_intent(&payment_intent_id)
            .await?
            .is_some()
        {
            return Err(MarketError::Validation(format!(
                "payment intent '{payment_intent_id}' is already registered"
            )));
        }
        let existing = self.payments.list_for_booking(booking.id).await?;
        if existing
            .iter()
            .any(|payment| payment.payment_type == payment_type)
        {
            return Err(MarketError::Validation(format!(
                "booking {} already has a '{payment_type}' installment",
                booking.id
            )));
        }

        let payment = BookingPayment::new(booking, payment_type, payment_intent_id);
        self.payments.put(payment.clone()).await?;
        debug!(
            "registered {} intent '{}' for booking {}",
            payment.payment_type, payment.payment_intent_id, payment.booking_id
        );
        Ok(payment)
    }

    /// Applies one processor event to the matching payment record.
    ///
    /// Idempotent under at-least-once delivery: replaying the status the
    /// record already holds returns it unchanged, with nothing re-stamped.
    /// Any other mutation of a terminal record is a terminal-state error.
    pub async fn record_payment_event(
        &self,
        payment_intent_id: &str,
        new_status: PaymentStatus,
        metadata: &Value,
    ) -> Result<BookingPayment> {
        let mut payment = self
            .payments
            .get_by_intent(payment_intent_id)
            .await?
            .ok_or_else(|| MarketError::NotFound("payment not found".into()))?;

        if payment.status == new_status {
            debug!("replayed '{new_status}' event for intent '{payment_intent_id}'");
            return Ok(payment);
        }
        if payment.status.is_terminal() {
            return Err(MarketError::TerminalState(format!(
                "payment is already '{}'",
                payment.status
            )));
        }
        if !payment.status.can_transition_to(new_status) {
            return Err(MarketError::InvalidTransition(format!(
                "payment cannot move from '{}' to '{new_status}'",
                payment.status
            )));
        }
        if new_status == PaymentStatus::Failed {
            let reason = failure_reason(metadata).ok_or_else(|| {
                MarketError::Validation("a failed event requires a failure_reason".into())
            })?;
            payment.failure_reason = Some(reason);
        }

        payment.status = new_status;
        if new_status == PaymentStatus::Succeeded && payment.captured_at.is_none() {
            payment.captured_at = Some(Utc::now());
        }
        self.payments.put(payment.clone()).await?;

        if new_status == PaymentStatus::Succeeded {
            let progress = match payment.payment_type {
                PaymentType::Upfront30 => PaymentProgress::PartiallyPaid,
                PaymentType::Remaining70 => PaymentProgress::Paid,
            };
            if self
                .bookings
                .set_payment_progress(payment.booking_id, progress)
                .await?
                .is_none()
            {
                warn!(
                    "booking {} missing while advancing payment progress",
                    payment.booking_id
                );
            }
        }

        Ok(payment)
    }

    /// Stamps the payout to the professional. Transfers are causally after
    /// capture; anything else is rejected.
    pub async fn record_transfer(
        &self,
        payment_intent_id: &str,
        transfer_id: &str,
    ) -> Result<BookingPayment> {
        let mut payment = self
            .payments
            .get_by_intent(payment_intent_id)
            .await?
            .ok_or_else(|| MarketError::NotFound("payment not found".into()))?;

        if payment.transfer_id.as_deref() == Some(transfer_id) {
            debug!("replayed transfer '{transfer_id}' for intent '{payment_intent_id}'");
            return Ok(payment);
        }
        if payment.transferred_at.is_some() {
            return Err(MarketError::InvalidTransition(
                "payment is already transferred".into(),
            ));
        }
        if payment.status != PaymentStatus::Succeeded || payment.captured_at.is_none() {
            return Err(MarketError::InvalidTransition(
                "transfer requires a captured payment".into(),
            ));
        }

        payment.transferred_at = Some(Utc::now());
        payment.transfer_id = Some(transfer_id.to_string());
        self.payments.put(payment.clone()).await?;
        Ok(payment)
    }

    pub async fn payments_for_booking(&self, booking_id: Uuid) -> Result<Vec<BookingPayment>> {
        self.payments.list_for_booking(booking_id).await
    }
}

fn failure_reason(metadata: &Value) -> Option<String> {
    metadata
        .get("failure_reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(String::from)
}

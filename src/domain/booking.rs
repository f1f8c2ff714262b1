use crate::domain::payment::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Booking status state machine.
///
/// `Pending → Confirmed → InProgress → Completed`, with `Cancelled` reachable
/// from any non-terminal state. `Disputed` and `Refunded` are payment-driven
/// terminal states reachable only from `Completed`, outside the status-update
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
    Refunded,
}

impl BookingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Disputed | Self::Refunded
        )
    }

    /// Statuses a professional may request through the status-update
    /// operation. Everything else is rejected before any read.
    pub fn is_requestable(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::InProgress | Self::Completed | Self::Cancelled
        )
    }

    /// Position along the forward progress chain; `None` for states outside
    /// it.
    fn progress_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::InProgress => Some(2),
            Self::Completed => Some(3),
            _ => None,
        }
    }

    /// Transitions are monotonic: forward jumps along the progress chain are
    /// allowed, cancellation from any non-terminal state, nothing else.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Cancelled {
            return true;
        }
        match (self.progress_rank(), next.progress_rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
            Self::Refunded => "refunded",
        };
        f.write_str(label)
    }
}

/// How far the split payment for a booking has progressed.
///
/// Advanced by the payment lifecycle, never by the status-update operation:
/// the two lifecycles share the booking but mutate disjoint fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProgress {
    Pending,
    PartiallyPaid,
    Paid,
    Refunded,
}

impl PaymentProgress {
    /// Progress only ever moves forward; an out-of-order upfront success must
    /// not demote a booking already marked paid.
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::PartiallyPaid => 1,
            Self::Paid => 2,
            Self::Refunded => 3,
        }
    }
}

/// A scheduled engagement between a client and a professional for a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub service_id: Uuid,
    pub status: BookingStatus,
    pub event_date: DateTime<Utc>,
    pub total_amount: Money,
    pub currency: String,
    pub payment_status: PaymentProgress,
    pub status_updated_at: DateTime<Utc>,
    /// Set exactly once, when the booking first reaches `Completed`.
    pub completion_date: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        client_id: Uuid,
        professional_id: Uuid,
        service_id: Uuid,
        event_date: DateTime<Utc>,
        total_amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            professional_id,
            service_id,
            status: BookingStatus::Pending,
            event_date,
            total_amount,
            currency: currency.into(),
            payment_status: PaymentProgress::Pending,
            status_updated_at: Utc::now(),
            completion_date: None,
        }
    }
}

/// The field set written by the store's conditional status update.
#[derive(Debug, Clone, Copy)]
pub struct StatusUpdate {
    pub status: BookingStatus,
    pub status_updated_at: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn at(status: BookingStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            status_updated_at: now,
            completion_date: (status == BookingStatus::Completed).then_some(now),
        }
    }
}

/// Aggregate view over a professional's bookings.
#[derive(Debug, Clone, Default)]
pub struct BookingStats {
    pub counts: HashMap<BookingStatus, u64>,
    /// Sum of totals over completed, fully paid bookings.
    pub total_earnings: Money,
}

impl BookingStats {
    pub fn count(&self, status: BookingStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requestable_statuses() {
        assert!(BookingStatus::Confirmed.is_requestable());
        assert!(BookingStatus::InProgress.is_requestable());
        assert!(BookingStatus::Completed.is_requestable());
        assert!(BookingStatus::Cancelled.is_requestable());
        assert!(!BookingStatus::Pending.is_requestable());
        assert!(!BookingStatus::Disputed.is_requestable());
        assert!(!BookingStatus::Refunded.is_requestable());
    }

    #[test]
    fn test_forward_jumps_are_allowed() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn test_backward_moves_are_rejected() {
        assert!(!BookingStatus::InProgress.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Confirmed));
    }

    #[test]
    fn test_cancellation_from_any_non_terminal_state() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Disputed,
            BookingStatus::Refunded,
        ] {
            assert!(!terminal.can_transition_to(BookingStatus::Confirmed));
            assert!(!terminal.can_transition_to(BookingStatus::Completed));
        }
    }

    #[test]
    fn test_status_update_stamps_completion_only_for_completed() {
        let now = Utc::now();
        let update = StatusUpdate::at(BookingStatus::Completed, now);
        assert_eq!(update.completion_date, Some(now));

        let update = StatusUpdate::at(BookingStatus::Confirmed, now);
        assert_eq!(update.completion_date, None);
    }

    #[test]
    fn test_payment_progress_is_ordered() {
        assert!(PaymentProgress::PartiallyPaid.rank() < PaymentProgress::Paid.rank());
        assert!(PaymentProgress::Pending.rank() < PaymentProgress::PartiallyPaid.rank());
    }
}

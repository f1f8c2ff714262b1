use crate::domain::booking::Booking;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use uuid::Uuid;

/// The marketplace's cut of a booking total.
pub const PLATFORM_FEE_RATE: Decimal = dec!(0.10);
/// Share of the booking total charged up front.
pub const UPFRONT_SHARE: Decimal = dec!(0.30);

/// A monetary value in the booking's currency.
///
/// Wraps `rust_decimal::Decimal` so financial arithmetic stays exact and
/// amounts never pick up float rounding.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Rounds to the two decimals carried on payment records.
    pub fn round_cents(self) -> Self {
        Self(self.0.round_dp(2))
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which of the two installments a payment record covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "upfront_30")]
    Upfront30,
    #[serde(rename = "remaining_70")]
    Remaining70,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Upfront30 => "upfront_30",
            Self::Remaining70 => "remaining_70",
        };
        f.write_str(label)
    }
}

/// Payment-intent state machine, mirroring the external processor.
///
/// Transitions are recorded from asynchronous processor events, never driven
/// from here. Events may skip intermediate states but never move backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Succeeded,
    Cancelled,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled | Self::Failed)
    }

    fn progress_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::RequiresPaymentMethod => Some(1),
            Self::RequiresConfirmation => Some(2),
            Self::RequiresAction => Some(3),
            Self::Processing => Some(4),
            Self::RequiresCapture => Some(5),
            Self::Succeeded => Some(6),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Cancelled | Self::Failed) {
            return true;
        }
        match (self.progress_rank(), next.progress_rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Succeeded => "succeeded",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The amounts carried by one installment record.
///
/// Fee convention: each record carries the installment's share of the 10 %
/// platform fee, so fees across both installments sum to 10 % of the booking
/// total. `amount = platform_fee + professional_amount` holds by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    pub amount: Money,
    pub platform_fee: Money,
    pub professional_amount: Money,
}

impl PaymentSplit {
    /// Computes the split once, at record creation. The remaining installment
    /// is the exact complement of the rounded upfront one, so the two always
    /// sum to the booking total.
    pub fn for_installment(total: Money, payment_type: PaymentType) -> Self {
        let upfront = Money(total.0 * UPFRONT_SHARE).round_cents();
        let amount = match payment_type {
            PaymentType::Upfront30 => upfront,
            PaymentType::Remaining70 => total - upfront,
        };
        let platform_fee = Money(amount.0 * PLATFORM_FEE_RATE).round_cents();
        let professional_amount = amount - platform_fee;
        Self {
            amount,
            platform_fee,
            professional_amount,
        }
    }
}

/// One installment of a booking's split payment.
///
/// Append-only once succeeded: the only later mutation is the transfer stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPayment {
    pub id: Uuid,
    /// External payment-intent identifier; unique and stable.
    pub payment_intent_id: String,
    pub booking_id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Uuid,
    pub payment_type: PaymentType,
    pub amount: Money,
    pub platform_fee: Money,
    pub professional_amount: Money,
    pub currency: String,
    pub status: PaymentStatus,
    pub captured_at: Option<DateTime<Utc>>,
    pub transferred_at: Option<DateTime<Utc>>,
    /// External transfer identifier, set once funds move to the professional.
    pub transfer_id: Option<String>,
    pub failure_reason: Option<String>,
}

impl BookingPayment {
    pub fn new(booking: &Booking, payment_type: PaymentType, payment_intent_id: String) -> Self {
        let split = PaymentSplit::for_installment(booking.total_amount, payment_type);
        Self {
            id: Uuid::new_v4(),
            payment_intent_id,
            booking_id: booking.id,
            client_id: booking.client_id,
            professional_id: booking.professional_id,
            payment_type,
            amount: split.amount,
            platform_fee: split.platform_fee,
            professional_amount: split.professional_amount,
            currency: booking.currency.clone(),
            status: PaymentStatus::Pending,
            captured_at: None,
            transferred_at: None,
            transfer_id: None,
            failure_reason: None,
        }
    }
}

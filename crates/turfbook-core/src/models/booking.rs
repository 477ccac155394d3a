//! Booking model
//!
//! A booking reserves one hour-aligned slot of a venue on a specific date.
//! The booking lifecycle:
//! 1. Created when the slot is claimed (Pending)
//! 2. Confirmed on payment
//! 3. Completed after play, or cancelled with a computed refund
//!
//! Bookings are never deleted, only status-transitioned, so the table doubles
//! as an audit trail.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix for human-readable booking references
pub const REFERENCE_PREFIX: &str = "TB";

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Slot claimed, payment not yet confirmed
    #[default]
    Pending,
    /// Payment confirmed
    Confirmed,
    /// Slot was played out (terminal)
    Completed,
    /// Booking was cancelled (terminal)
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl BookingStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Check if the booking still holds its slot
    pub fn holds_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    /// Check if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Check whether a transition to `next` is allowed
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment
    #[default]
    Pending,
    /// Payment received
    Paid,
    /// Payment returned after cancellation
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

impl PaymentStatus {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// Customer details captured with the booking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Customer display name
    pub name: String,

    /// Contact phone
    pub phone: Option<String>,
}

/// Cancellation record, written exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationRecord {
    /// When the cancellation happened
    pub cancelled_at: DateTime<Utc>,

    /// Who cancelled
    pub cancelled_by: Uuid,

    /// Optional free-text reason
    pub reason: Option<String>,

    /// Refund amount, 0 <= refund <= total
    pub refund_amount: Decimal,

    /// Refund percentage tier (100, 80, 50 or 0)
    pub refund_percentage: u32,
}

/// Post-play review left by the customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReview {
    /// Rating 1-5
    pub rating: i16,

    /// Optional comment
    pub comment: Option<String>,
}

/// Booking entity
///
/// The mutual-exclusion invariant: at most one booking with a status that
/// holds its slot may exist per (venue, date, slot start).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier (UUID)
    pub id: Uuid,

    /// Sequential reference number, assigned by the store
    pub reference: i64,

    /// Venue being booked
    pub venue_id: Uuid,

    /// User who owns this booking
    pub user_id: Uuid,

    /// Calendar date of the slot
    pub date: NaiveDate,

    /// Slot start time, hour aligned
    pub slot_start: NaiveTime,

    /// Duration in hours (0.5 to 8, half-hour steps)
    pub duration_hours: Decimal,

    /// Total amount charged
    pub total_amount: Decimal,

    /// ISO currency code, denormalized from the venue
    pub currency: String,

    /// Current status
    pub status: BookingStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// Customer details
    pub customer: CustomerDetails,

    /// Cancellation record, if cancelled
    pub cancellation: Option<CancellationRecord>,

    /// Review record, if reviewed
    pub review: Option<BookingReview>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create a new pending booking
    ///
    /// The sequential `reference` starts at 0 and is assigned by the store
    /// on insert.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        venue_id: Uuid,
        user_id: Uuid,
        date: NaiveDate,
        slot_start: NaiveTime,
        duration_hours: Decimal,
        total_amount: Decimal,
        currency: String,
        customer: CustomerDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference: 0,
            venue_id,
            user_id,
            date,
            slot_start,
            duration_hours,
            total_amount,
            currency,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            customer,
            cancellation: None,
            review: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Slot start as a combined date-time
    #[inline]
    pub fn start_date_time(&self) -> NaiveDateTime {
        self.date.and_time(self.slot_start)
    }

    /// Slot end as a combined date-time
    pub fn end_date_time(&self) -> NaiveDateTime {
        let minutes = (self.duration_hours * Decimal::from(60))
            .to_i64()
            .unwrap_or(0);
        self.start_date_time() + Duration::minutes(minutes)
    }

    /// Slot end time of day
    pub fn end_time(&self) -> NaiveTime {
        self.end_date_time().time()
    }

    /// Human-readable reference, e.g. "TB-000042"
    pub fn formatted_reference(&self) -> String {
        format!("{}-{:06}", REFERENCE_PREFIX, self.reference)
    }

    /// Check if the booking still holds its slot
    #[inline]
    pub fn holds_slot(&self) -> bool {
        self.status.holds_slot()
    }
}

impl Default for Booking {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference: 0,
            venue_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: now.date_naive(),
            slot_start: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            duration_hours: Decimal::ONE,
            total_amount: Decimal::ZERO,
            currency: "INR".to_string(),
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            customer: CustomerDetails::default(),
            cancellation: None,
            review: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));

        // Terminal states admit nothing
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        // No skipping payment
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn test_status_predicates() {
        assert!(BookingStatus::Pending.holds_slot());
        assert!(BookingStatus::Confirmed.holds_slot());
        assert!(BookingStatus::Completed.holds_slot());
        assert!(!BookingStatus::Cancelled.holds_slot());

        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::from_str(&status.to_string()), Some(status));
        }
        assert_eq!(BookingStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_derived_date_times() {
        let booking = Booking {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            slot_start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_hours: dec!(1.5),
            ..Default::default()
        };

        assert_eq!(
            booking.start_date_time(),
            NaiveDate::from_ymd_opt(2025, 6, 1)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap()
        );
        assert_eq!(
            booking.end_time(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_formatted_reference() {
        let booking = Booking {
            reference: 42,
            ..Default::default()
        };

        assert_eq!(booking.formatted_reference(), "TB-000042");
    }
}

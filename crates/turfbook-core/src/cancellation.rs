//! Cancellation-refund policy
//!
//! Decides whether a booking may still be cancelled and which refund tier
//! applies, as a function of time remaining before the slot start.
//!
//! Refund tiers (hours until booking start, boundaries inclusive of the
//! higher tier):
//! - >= 24h: 100%
//! - >= 12h: 80%
//! - >=  2h: 50%
//! - <   2h: not cancellable, refund 0

use crate::models::Booking;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Refund percentage when cancelling 24h or more ahead
pub const FULL_REFUND_PERCENT: u32 = 100;

/// Refund percentage when cancelling between 12h and 24h ahead
pub const HIGH_REFUND_PERCENT: u32 = 80;

/// Refund percentage when cancelling between 2h and 12h ahead
pub const PARTIAL_REFUND_PERCENT: u32 = 50;

/// Cancellation thresholds, in hours before slot start
///
/// Defaults match the platform policy; venues may override all three.
/// Invariant: `full_refund_hours >= high_refund_hours >= min_notice_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationTerms {
    /// Minimum notice below which cancellation is refused
    pub min_notice_hours: i64,

    /// Notice required for a full refund
    pub full_refund_hours: i64,

    /// Notice required for the 80% tier
    pub high_refund_hours: i64,
}

impl Default for CancellationTerms {
    fn default() -> Self {
        Self {
            min_notice_hours: 2,
            full_refund_hours: 24,
            high_refund_hours: 12,
        }
    }
}

impl CancellationTerms {
    /// Check threshold ordering
    pub fn is_valid(&self) -> bool {
        self.min_notice_hours >= 0
            && self.high_refund_hours >= self.min_notice_hours
            && self.full_refund_hours >= self.high_refund_hours
    }
}

/// Computed refund for a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    /// Amount returned to the customer
    pub amount: Decimal,

    /// Percentage tier applied
    pub percentage: u32,
}

impl Refund {
    /// Zero refund
    pub fn none() -> Self {
        Self {
            amount: Decimal::ZERO,
            percentage: 0,
        }
    }
}

/// Minutes remaining until the booking's slot starts
///
/// Negative when the slot start has already passed.
fn minutes_until_start(booking: &Booking, now: DateTime<Utc>) -> i64 {
    (booking.start_date_time() - now.naive_utc()).num_minutes()
}

/// Whether the booking may still be cancelled at `now`
///
/// Eligible only while pending or confirmed, with at least the minimum
/// notice remaining.
pub fn can_cancel(booking: &Booking, terms: &CancellationTerms, now: DateTime<Utc>) -> bool {
    if booking.status.is_terminal() {
        return false;
    }

    minutes_until_start(booking, now) >= terms.min_notice_hours * 60
}

/// Refund due if the booking is cancelled at `now`
///
/// Returns a zero refund when cancellation is not allowed. Amounts are
/// rounded to 2 decimal places, midpoint away from zero.
pub fn refund(booking: &Booking, terms: &CancellationTerms, now: DateTime<Utc>) -> Refund {
    if !can_cancel(booking, terms, now) {
        return Refund::none();
    }

    let minutes = minutes_until_start(booking, now);

    let percentage = if minutes >= terms.full_refund_hours * 60 {
        FULL_REFUND_PERCENT
    } else if minutes >= terms.high_refund_hours * 60 {
        HIGH_REFUND_PERCENT
    } else if minutes >= terms.min_notice_hours * 60 {
        PARTIAL_REFUND_PERCENT
    } else {
        // Unreachable behind the can_cancel gate, kept for completeness
        0
    };

    let amount = (booking.total_amount * Decimal::from(percentage) / Decimal::from(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Refund { amount, percentage }
}

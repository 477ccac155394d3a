//! Time slot model
//!
//! A `TimeSlot` is one bookable hour-window on a specific date. Slots are
//! derived fresh from venue hours and existing bookings on every query and
//! never persisted.

use chrono::{NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bookable hour-window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot start, hour aligned
    pub start: NaiveTime,

    /// Slot end (start + 1h)
    pub end: NaiveTime,

    /// Price for this hour
    pub price: Decimal,

    /// Whether the slot is free to book
    pub available: bool,
}

impl TimeSlot {
    /// Slot start hour of day
    #[inline]
    pub fn hour(&self) -> u32 {
        self.start.hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_slot_hour() {
        let slot = TimeSlot {
            start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            price: dec!(2000),
            available: true,
        };

        assert_eq!(slot.hour(), 18);
    }
}

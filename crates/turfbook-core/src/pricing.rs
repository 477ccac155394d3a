//! Time-of-day pricing policy
//!
//! Maps an hour of day to a price category and computes the price of a slot
//! from the venue's base price and category multiplier.
//!
//! Canonical category boundaries (hours inclusive):
//! morning 06-11, afternoon 12-16, evening 17-20, night 21-05.

use crate::models::Venue;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day price category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 05:59
    Night,
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceCategory::Morning => write!(f, "morning"),
            PriceCategory::Afternoon => write!(f, "afternoon"),
            PriceCategory::Evening => write!(f, "evening"),
            PriceCategory::Night => write!(f, "night"),
        }
    }
}

impl PriceCategory {
    /// Category for an hour of day (0-23)
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => PriceCategory::Morning,
            12..=16 => PriceCategory::Afternoon,
            17..=20 => PriceCategory::Evening,
            _ => PriceCategory::Night,
        }
    }
}

/// Price of a one-hour slot starting at `hour`
///
/// `base_price * multiplier(category)`, rounded to the nearest whole
/// currency unit (midpoint away from zero).
pub fn quote(venue: &Venue, hour: u32) -> Decimal {
    let category = PriceCategory::from_hour(hour);
    let multiplier = venue.multipliers.for_category(category);

    (venue.base_price * multiplier).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationTerms;
    use crate::models::{PriceMultipliers, WeeklyHours};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn venue(base_price: Decimal, multipliers: PriceMultipliers) -> Venue {
        Venue {
            id: Uuid::new_v4(),
            name: "Test Turf".to_string(),
            base_price,
            currency: "INR".to_string(),
            multipliers,
            hours: WeeklyHours::default(),
            min_duration_hours: dec!(0.5),
            advance_booking_days: 30,
            cancellation: CancellationTerms::default(),
            is_active: true,
            total_bookings: 0,
            total_revenue: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(PriceCategory::from_hour(5), PriceCategory::Night);
        assert_eq!(PriceCategory::from_hour(6), PriceCategory::Morning);
        assert_eq!(PriceCategory::from_hour(11), PriceCategory::Morning);
        assert_eq!(PriceCategory::from_hour(12), PriceCategory::Afternoon);
        assert_eq!(PriceCategory::from_hour(16), PriceCategory::Afternoon);
        assert_eq!(PriceCategory::from_hour(17), PriceCategory::Evening);
        // 20:00 is still evening, 21:00 is night
        assert_eq!(PriceCategory::from_hour(20), PriceCategory::Evening);
        assert_eq!(PriceCategory::from_hour(21), PriceCategory::Night);
        assert_eq!(PriceCategory::from_hour(0), PriceCategory::Night);
    }

    #[test]
    fn test_quote_with_multiplier() {
        let v = venue(
            dec!(1000),
            PriceMultipliers {
                morning: Some(dec!(1.0)),
                evening: Some(dec!(1.2)),
                ..Default::default()
            },
        );

        assert_eq!(quote(&v, 18), dec!(1200));
        assert_eq!(quote(&v, 8), dec!(1000));
    }

    #[test]
    fn test_quote_defaults_to_base_price() {
        let v = venue(dec!(2000), PriceMultipliers::default());

        for hour in 0..24 {
            assert_eq!(quote(&v, hour), dec!(2000));
        }
    }

    #[test]
    fn test_quote_rounds_to_whole_units() {
        let v = venue(
            dec!(999),
            PriceMultipliers {
                evening: Some(dec!(1.25)),
                ..Default::default()
            },
        );

        // 999 * 1.25 = 1248.75, rounds away from zero to 1249
        assert_eq!(quote(&v, 18), dec!(1249));
    }
}

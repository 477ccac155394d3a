//! Venue model
//!
//! Represents a bookable sports facility with per-weekday operating hours
//! and time-of-day price multipliers. Venues are read-mostly from the
//! booking engine's perspective; ownership and editing live elsewhere.

use crate::cancellation::CancellationTerms;
use crate::pricing::PriceCategory;
use chrono::{DateTime, NaiveTime, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operating hours for a single weekday
///
/// Invariant: either `closed` is set or `open < close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    /// Opening time
    pub open: NaiveTime,

    /// Closing time (exclusive)
    pub close: NaiveTime,

    /// Whether the venue is closed this weekday
    pub closed: bool,
}

impl DayHours {
    /// Closed all day
    pub fn closed() -> Self {
        Self {
            open: NaiveTime::MIN,
            close: NaiveTime::MIN,
            closed: true,
        }
    }

    /// Open between the given times
    pub fn open(open: NaiveTime, close: NaiveTime) -> Self {
        Self {
            open,
            close,
            closed: false,
        }
    }

    /// Check the open < close invariant
    pub fn is_valid(&self) -> bool {
        self.closed || self.open < self.close
    }
}

impl Default for DayHours {
    fn default() -> Self {
        Self::closed()
    }
}

/// Operating hours for the full week, indexed Monday..Sunday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHours {
    days: [DayHours; 7],
}

impl WeeklyHours {
    /// Build from a Monday-first array
    pub fn new(days: [DayHours; 7]) -> Self {
        Self { days }
    }

    /// Same hours every day of the week
    pub fn uniform(hours: DayHours) -> Self {
        Self { days: [hours; 7] }
    }

    /// Hours for a specific weekday
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// Replace the hours for one weekday
    pub fn set(&mut self, weekday: Weekday, hours: DayHours) {
        self.days[weekday.num_days_from_monday() as usize] = hours;
    }

    /// Check the per-day invariant across the week
    pub fn is_valid(&self) -> bool {
        self.days.iter().all(DayHours::is_valid)
    }
}

/// Per-category price multipliers
///
/// Missing entries default to a multiplier of 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMultipliers {
    pub morning: Option<Decimal>,
    pub afternoon: Option<Decimal>,
    pub evening: Option<Decimal>,
    pub night: Option<Decimal>,
}

impl PriceMultipliers {
    /// Multiplier for a price category, defaulting to 1
    pub fn for_category(&self, category: PriceCategory) -> Decimal {
        let configured = match category {
            PriceCategory::Morning => self.morning,
            PriceCategory::Afternoon => self.afternoon,
            PriceCategory::Evening => self.evening,
            PriceCategory::Night => self.night,
        };
        configured.unwrap_or(Decimal::ONE)
    }
}

/// Venue entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Base price per one-hour slot
    pub base_price: Decimal,

    /// ISO currency code
    pub currency: String,

    /// Time-of-day price multipliers
    pub multipliers: PriceMultipliers,

    /// Weekly operating hours
    pub hours: WeeklyHours,

    /// Minimum booking duration in hours
    pub min_duration_hours: Decimal,

    /// How many days ahead a slot may be booked
    pub advance_booking_days: i64,

    /// Cancellation policy thresholds
    pub cancellation: CancellationTerms,

    /// Whether the venue accepts bookings
    pub is_active: bool,

    /// Aggregate booking count (maintained by the stats aggregator)
    pub total_bookings: i64,

    /// Aggregate revenue (maintained by the stats aggregator)
    pub total_revenue: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Venue {
    /// Hours for the weekday of a given date
    pub fn day_hours(&self, weekday: Weekday) -> &DayHours {
        self.hours.for_weekday(weekday)
    }

    /// Check whether a whole-hour slot start lies within operating hours
    pub fn is_open_at_hour(&self, weekday: Weekday, hour: u32) -> bool {
        let day = self.day_hours(weekday);
        if day.closed {
            return false;
        }
        hour >= day.open.hour() && hour < day.close.hour()
    }
}

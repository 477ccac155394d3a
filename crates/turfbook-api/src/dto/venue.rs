//! Venue DTOs

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Serialize;
use turfbook_core::models::Venue;
use uuid::Uuid;

/// Venue summary response
#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub currency: String,
    pub multipliers: MultipliersResponse,
    pub operating_hours: Vec<DayHoursResponse>,
    pub min_duration_hours: Decimal,
    pub advance_booking_days: i64,
    pub is_active: bool,
}

/// Price multipliers echoed back to clients
#[derive(Debug, Serialize)]
pub struct MultipliersResponse {
    pub morning: Option<Decimal>,
    pub afternoon: Option<Decimal>,
    pub evening: Option<Decimal>,
    pub night: Option<Decimal>,
}

/// Operating hours for one weekday
#[derive(Debug, Serialize)]
pub struct DayHoursResponse {
    pub weekday: String,
    pub open: String,
    pub close: String,
    pub closed: bool,
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl From<Venue> for VenueResponse {
    fn from(venue: Venue) -> Self {
        let operating_hours = WEEK
            .iter()
            .map(|&weekday| {
                let day = venue.hours.for_weekday(weekday);
                DayHoursResponse {
                    weekday: weekday.to_string().to_lowercase(),
                    open: day.open.format("%H:%M").to_string(),
                    close: day.close.format("%H:%M").to_string(),
                    closed: day.closed,
                }
            })
            .collect();

        Self {
            id: venue.id,
            name: venue.name,
            base_price: venue.base_price,
            currency: venue.currency,
            multipliers: MultipliersResponse {
                morning: venue.multipliers.morning,
                afternoon: venue.multipliers.afternoon,
                evening: venue.multipliers.evening,
                night: venue.multipliers.night,
            },
            operating_hours,
            min_duration_hours: venue.min_duration_hours,
            advance_booking_days: venue.advance_booking_days,
            is_active: venue.is_active,
        }
    }
}

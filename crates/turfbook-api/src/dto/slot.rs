//! Slot availability DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use turfbook_core::models::TimeSlot;

/// Query parameters for the slot listing
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    /// Calendar date to inspect (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// One bookable hour in the response
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub start: String,
    pub end: String,
    pub price: Decimal,
    pub available: bool,
}

impl From<TimeSlot> for SlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            start: slot.start.format("%H:%M").to_string(),
            end: slot.end.format("%H:%M").to_string(),
            price: slot.price,
            available: slot.available,
        }
    }
}

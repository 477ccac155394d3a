//! Venue calendar service
//!
//! Derives the bookable slots of a venue for a calendar date. Slots are
//! recomputed from venue hours and current bookings on every call; nothing
//! is cached, so two calls with unchanged inputs return identical results.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use turfbook_core::{
    models::{TimeSlot, Venue},
    pricing,
    traits::BookingRepository,
    AppResult,
};

/// Venue calendar
///
/// Pure read: queries existing bookings once per call and annotates each
/// hour with availability and price.
pub struct VenueCalendar<R: BookingRepository> {
    bookings: Arc<R>,
}

impl<R: BookingRepository> VenueCalendar<R> {
    /// Create a new venue calendar
    pub fn new(bookings: Arc<R>) -> Self {
        Self { bookings }
    }

    /// Available slots for a venue on a date
    ///
    /// One slot per whole hour from opening (inclusive) to closing
    /// (exclusive). Returns an empty list when the venue is closed that
    /// weekday, or when the configured hours are degenerate.
    #[instrument(skip(self, venue), fields(venue_id = %venue.id))]
    pub async fn available_slots(
        &self,
        venue: &Venue,
        date: NaiveDate,
    ) -> AppResult<Vec<TimeSlot>> {
        let day = venue.day_hours(date.weekday());

        if day.closed {
            debug!("Venue closed on {}", date.weekday());
            return Ok(Vec::new());
        }

        // Defensive: the venue invariant guarantees open < close, but a
        // degenerate row must not produce slots.
        if day.close <= day.open {
            return Ok(Vec::new());
        }

        let existing = self.bookings.find_holding_slots(venue.id, date).await?;
        let taken: HashSet<u32> = existing.iter().map(|b| b.slot_start.hour()).collect();

        let mut slots = Vec::with_capacity((day.close.hour() - day.open.hour()) as usize);
        for hour in day.open.hour()..day.close.hour() {
            let start = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
            let end = NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap_or(NaiveTime::MIN);

            slots.push(TimeSlot {
                start,
                end,
                price: pricing::quote(venue, hour),
                available: !taken.contains(&hour),
            });
        }

        debug!(
            "Derived {} slots for venue {} on {} ({} taken)",
            slots.len(),
            venue.id,
            date,
            taken.len()
        );

        Ok(slots)
    }
}

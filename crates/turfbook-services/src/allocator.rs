//! Slot allocator service
//!
//! The concurrency-critical step of booking creation. Claiming a slot is a
//! single conditional insert in the store; of N concurrent claims for the
//! same (venue, date, slot start), exactly one succeeds and the rest get
//! `SlotConflict`. There is no read-then-write window anywhere on this
//! path.

use std::sync::Arc;
use tracing::{info, instrument, warn};
use turfbook_core::{models::Booking, traits::BookingRepository, AppError, AppResult};

/// Slot allocator
pub struct SlotAllocator<R: BookingRepository> {
    bookings: Arc<R>,
}

impl<R: BookingRepository> SlotAllocator<R> {
    /// Create a new slot allocator
    pub fn new(bookings: Arc<R>) -> Self {
        Self { bookings }
    }

    /// Atomically claim the booking's slot
    ///
    /// Consumes a fully-priced pending booking and either persists it (with
    /// its store-assigned reference) or fails with `SlotConflict`. A
    /// conflict is a normal, user-retryable outcome, not a fault.
    #[instrument(skip(self, booking), fields(venue_id = %booking.venue_id, date = %booking.date))]
    pub async fn try_reserve(&self, booking: Booking) -> AppResult<Booking> {
        match self.bookings.insert_if_slot_free(&booking).await? {
            Some(stored) => {
                info!(
                    "Reserved slot {} {} at venue {} as booking {}",
                    stored.date, stored.slot_start, stored.venue_id, stored.id
                );
                Ok(stored)
            }
            None => {
                warn!(
                    "Slot conflict: {} {} at venue {} already held",
                    booking.date, booking.slot_start, booking.venue_id
                );
                Err(AppError::SlotConflict {
                    date: booking.date,
                    start: booking.slot_start,
                })
            }
        }
    }
}

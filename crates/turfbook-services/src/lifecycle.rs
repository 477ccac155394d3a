//! Booking lifecycle service
//!
//! Orchestrates the booking state machine:
//! create (pending) -> confirm (confirmed) -> complete (completed), with
//! cancellation allowed from pending or confirmed under the venue's
//! cancellation terms.
//!
//! Every mutation is a status-guarded compare-and-swap in the store, so a
//! lost race surfaces as an explicit transition error instead of silently
//! overwriting terminal state.

use crate::allocator::SlotAllocator;
use crate::constants::{DURATION_STEP_HOURS, MAX_DURATION_HOURS, MIN_DURATION_HOURS};
use crate::stats::BookingEvent;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};
use turfbook_core::{
    cancellation::{self, Refund},
    models::{Booking, BookingStatus, CancellationRecord, CustomerDetails, PaymentStatus, Venue},
    pricing,
    traits::{BookingRepository, VenueRepository},
    AppError, AppResult, Clock,
};
use uuid::Uuid;

/// Duration bounds applied to booking creation
#[derive(Debug, Clone, Copy)]
pub struct DurationLimits {
    /// Platform-wide minimum duration in hours
    pub min_hours: Decimal,

    /// Platform-wide maximum duration in hours
    pub max_hours: Decimal,
}

impl Default for DurationLimits {
    fn default() -> Self {
        Self {
            min_hours: MIN_DURATION_HOURS,
            max_hours: MAX_DURATION_HOURS,
        }
    }
}

/// Booking creation request
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub venue_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub duration_hours: Decimal,
    pub customer: CustomerDetails,
}

/// Outcome of a cancellation
#[derive(Debug, Clone)]
pub struct CancelResult {
    /// The booking after the transition
    pub booking: Booking,

    /// Refund granted
    pub refund: Refund,
}

/// Booking lifecycle service
pub struct BookingLifecycle<R, V, C>
where
    R: BookingRepository,
    V: VenueRepository,
    C: Clock,
{
    bookings: Arc<R>,
    venues: Arc<V>,
    allocator: SlotAllocator<R>,
    clock: Arc<C>,
    limits: DurationLimits,
    events: UnboundedSender<BookingEvent>,
}

impl<R, V, C> BookingLifecycle<R, V, C>
where
    R: BookingRepository,
    V: VenueRepository,
    C: Clock,
{
    /// Create a new booking lifecycle service
    pub fn new(
        bookings: Arc<R>,
        venues: Arc<V>,
        clock: Arc<C>,
        limits: DurationLimits,
        events: UnboundedSender<BookingEvent>,
    ) -> Self {
        let allocator = SlotAllocator::new(bookings.clone());
        Self {
            bookings,
            venues,
            allocator,
            clock,
            limits,
            events,
        }
    }

    /// Create a booking: validate, atomically claim the slot, persist pending
    #[instrument(skip(self, request), fields(venue_id = %request.venue_id))]
    pub async fn create(&self, request: CreateBooking) -> AppResult<Booking> {
        let venue = self
            .venues
            .find_by_id(request.venue_id)
            .await?
            .ok_or_else(|| AppError::VenueNotFound(request.venue_id.to_string()))?;

        if !venue.is_active {
            return Err(AppError::VenueClosed(format!(
                "venue {} is not accepting bookings",
                venue.id
            )));
        }

        self.validate_duration(&venue, request.duration_hours)?;
        self.validate_slot(&venue, request.date, request.slot_start, request.duration_hours)?;

        let now = self.clock.now();
        let today = now.date_naive();

        if request.date < today {
            return Err(AppError::Validation("booking date is in the past".to_string()));
        }
        if request.date > today + Duration::days(venue.advance_booking_days) {
            return Err(AppError::Validation(format!(
                "bookings open {} days in advance",
                venue.advance_booking_days
            )));
        }
        if request.date.and_time(request.slot_start) <= now.naive_utc() {
            return Err(AppError::Validation(
                "slot start has already passed".to_string(),
            ));
        }

        let slot_price = pricing::quote(&venue, request.slot_start.hour());
        let total_amount = (slot_price * request.duration_hours)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let booking = Booking::new(
            venue.id,
            request.user_id,
            request.date,
            request.slot_start,
            request.duration_hours,
            total_amount,
            venue.currency.clone(),
            request.customer,
            now,
        );

        let stored = self.allocator.try_reserve(booking).await?;

        info!(
            "Created booking {} ({}) for {}",
            stored.id,
            stored.formatted_reference(),
            stored.total_amount
        );

        self.emit(BookingEvent::Created {
            booking_id: stored.id,
            venue_id: stored.venue_id,
            user_id: stored.user_id,
            amount: stored.total_amount,
        });

        Ok(stored)
    }

    /// Confirm payment: pending -> confirmed
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, booking_id: Uuid) -> AppResult<Booking> {
        let booking = self.fetch(booking_id).await?;

        if booking.status != BookingStatus::Pending {
            return Err(AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            });
        }

        let mut updated = booking.clone();
        updated.status = BookingStatus::Confirmed;
        updated.payment_status = PaymentStatus::Paid;

        let stored = self
            .bookings
            .update_if_status(&updated, BookingStatus::Pending)
            .await?
            .ok_or_else(|| AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            })?;

        info!("Confirmed booking {}", stored.id);

        Ok(stored)
    }

    /// Cancel the booking and compute the refund
    ///
    /// The cancellation record is written exactly once; repeat attempts fail
    /// with `AlreadyCancelled` whether they lose the check or the swap.
    #[instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        cancelled_by: Uuid,
        reason: Option<String>,
    ) -> AppResult<CancelResult> {
        let booking = self.fetch(booking_id).await?;

        match booking.status {
            BookingStatus::Cancelled => {
                return Err(AppError::AlreadyCancelled(booking_id.to_string()));
            }
            BookingStatus::Completed => {
                return Err(AppError::InvalidTransition {
                    from: booking.status.to_string(),
                    to: BookingStatus::Cancelled.to_string(),
                });
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }

        let venue = self
            .venues
            .find_by_id(booking.venue_id)
            .await?
            .ok_or_else(|| AppError::VenueNotFound(booking.venue_id.to_string()))?;

        let now = self.clock.now();

        if !cancellation::can_cancel(&booking, &venue.cancellation, now) {
            return Err(AppError::NotCancellable(format!(
                "cancellation requires at least {}h notice before the slot",
                venue.cancellation.min_notice_hours
            )));
        }

        let refund = cancellation::refund(&booking, &venue.cancellation, now);
        debug!(
            "Refund for booking {}: {} ({}%)",
            booking.id, refund.amount, refund.percentage
        );

        let expected = booking.status;
        let mut updated = booking.clone();
        updated.status = BookingStatus::Cancelled;
        updated.cancellation = Some(CancellationRecord {
            cancelled_at: now,
            cancelled_by,
            reason,
            refund_amount: refund.amount,
            refund_percentage: refund.percentage,
        });
        if refund.amount > Decimal::ZERO {
            updated.payment_status = PaymentStatus::Refunded;
        }

        let stored = self
            .bookings
            .update_if_status(&updated, expected)
            .await?
            .ok_or_else(|| AppError::AlreadyCancelled(booking_id.to_string()))?;

        info!(
            "Cancelled booking {} with {}% refund",
            stored.id, refund.percentage
        );

        self.emit(BookingEvent::Cancelled {
            booking_id: stored.id,
            venue_id: stored.venue_id,
            user_id: stored.user_id,
            refund_amount: refund.amount,
        });

        Ok(CancelResult {
            booking: stored,
            refund,
        })
    }

    /// Complete the booking: confirmed -> completed
    ///
    /// Completing twice fails; so does completing an unpaid booking.
    #[instrument(skip(self))]
    pub async fn complete(&self, booking_id: Uuid) -> AppResult<Booking> {
        let booking = self.fetch(booking_id).await?;

        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: BookingStatus::Completed.to_string(),
            });
        }

        let mut updated = booking.clone();
        updated.status = BookingStatus::Completed;

        let stored = self
            .bookings
            .update_if_status(&updated, BookingStatus::Confirmed)
            .await?
            .ok_or_else(|| AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: BookingStatus::Completed.to_string(),
            })?;

        info!("Completed booking {}", stored.id);

        Ok(stored)
    }

    /// Fetch a booking or fail with BookingNotFound
    async fn fetch(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(booking_id.to_string()))
    }

    /// Emit a booking event; aggregation is soft bookkeeping, so a closed
    /// channel is logged and ignored.
    fn emit(&self, event: BookingEvent) {
        if self.events.send(event).is_err() {
            warn!("Stats channel closed, dropping booking event");
        }
    }

    fn validate_duration(&self, venue: &Venue, duration: Decimal) -> AppResult<()> {
        let min = self.limits.min_hours.max(venue.min_duration_hours);

        if duration < min || duration > self.limits.max_hours {
            return Err(AppError::Validation(format!(
                "duration must be between {} and {} hours",
                min, self.limits.max_hours
            )));
        }

        if !(duration / DURATION_STEP_HOURS).fract().is_zero() {
            return Err(AppError::Validation(
                "duration must be a multiple of half an hour".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_slot(
        &self,
        venue: &Venue,
        date: NaiveDate,
        slot_start: NaiveTime,
        duration: Decimal,
    ) -> AppResult<()> {
        if slot_start.minute() != 0 || slot_start.second() != 0 {
            return Err(AppError::Validation(
                "slot start must be aligned to a whole hour".to_string(),
            ));
        }

        let weekday = date.weekday();
        let day = venue.day_hours(weekday);

        if day.closed {
            return Err(AppError::VenueClosed(format!(
                "venue is closed on {}",
                weekday
            )));
        }

        if !venue.is_open_at_hour(weekday, slot_start.hour()) {
            return Err(AppError::Validation(format!(
                "slot {} is outside operating hours",
                slot_start
            )));
        }

        // The whole booked window must fit before closing
        let start_minutes = Decimal::from(slot_start.hour() * 60);
        let close_minutes = Decimal::from(day.close.hour() * 60 + day.close.minute());
        if start_minutes + duration * Decimal::from(60) > close_minutes {
            return Err(AppError::Validation(
                "booking extends past closing time".to_string(),
            ));
        }

        Ok(())
    }
}

//! Booking flow integration tests
//!
//! Exercises the calendar, allocator, and lifecycle against an in-memory
//! store. The store double keeps the same atomicity contract as the real
//! repository: slot claims and status swaps happen under one lock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use turfbook_core::{
    cancellation::CancellationTerms,
    clock::FixedClock,
    models::{
        Booking, BookingStatus, CustomerDetails, DayHours, PriceMultipliers, Venue, WeeklyHours,
    },
    traits::{BookingRepository, StatsRepository, VenueRepository},
    AppError, AppResult,
};
use turfbook_services::{
    stats::event_channel, BookingLifecycle, CreateBooking, DurationLimits, StatsAggregator,
    VenueCalendar,
};
use uuid::Uuid;

// ==================== In-memory store ====================

#[derive(Default)]
struct InMemoryBookings {
    inner: Mutex<BookingState>,
}

#[derive(Default)]
struct BookingState {
    bookings: HashMap<Uuid, Booking>,
    next_reference: i64,
}

#[async_trait]
impl BookingRepository for InMemoryBookings {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let state = self.inner.lock().unwrap();
        Ok(state.bookings.get(&id).cloned())
    }

    async fn insert_if_slot_free(&self, booking: &Booking) -> AppResult<Option<Booking>> {
        // Check and insert under one lock: same atomicity contract as the
        // partial unique index in PostgreSQL.
        let mut state = self.inner.lock().unwrap();

        let held = state.bookings.values().any(|b| {
            b.venue_id == booking.venue_id
                && b.date == booking.date
                && b.slot_start == booking.slot_start
                && b.holds_slot()
        });
        if held {
            return Ok(None);
        }

        state.next_reference += 1;
        let mut stored = booking.clone();
        stored.reference = state.next_reference;
        state.bookings.insert(stored.id, stored.clone());

        Ok(Some(stored))
    }

    async fn find_holding_slots(
        &self,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .bookings
            .values()
            .filter(|b| b.venue_id == venue_id && b.date == date && b.holds_slot())
            .cloned()
            .collect())
    }

    async fn update_if_status(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut state = self.inner.lock().unwrap();

        match state.bookings.get_mut(&booking.id) {
            Some(current) if current.status == expected => {
                *current = booking.clone();
                Ok(Some(current.clone()))
            }
            Some(_) => Ok(None),
            None => Err(AppError::BookingNotFound(booking.id.to_string())),
        }
    }

    async fn list_filtered(
        &self,
        venue_id: Option<Uuid>,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        let state = self.inner.lock().unwrap();

        let mut matching: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| venue_id.map_or(true, |v| b.venue_id == v))
            .filter(|b| date.map_or(true, |d| b.date == d))
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }
}

struct InMemoryVenues {
    venues: HashMap<Uuid, Venue>,
}

#[async_trait]
impl VenueRepository for InMemoryVenues {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Venue>> {
        Ok(self.venues.get(&id).cloned())
    }
}

#[derive(Default)]
struct CountingStats {
    created: AtomicI64,
    cancelled: AtomicI64,
}

#[async_trait]
impl StatsRepository for CountingStats {
    async fn record_created(&self, _: Uuid, _: Uuid, _: Decimal) -> AppResult<()> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record_cancelled(&self, _: Uuid, _: Uuid, _: Decimal) -> AppResult<()> {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ==================== Fixtures ====================

fn test_venue(base_price: Decimal, multipliers: PriceMultipliers) -> Venue {
    let open = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
    let close = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
    let mut hours = WeeklyHours::uniform(DayHours::open(open, close));
    hours.set(Weekday::Sun, DayHours::closed());

    Venue {
        id: Uuid::new_v4(),
        name: "Greenfield Turf".to_string(),
        base_price,
        currency: "INR".to_string(),
        multipliers,
        hours,
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

type TestLifecycle = BookingLifecycle<InMemoryBookings, InMemoryVenues, FixedClock>;

struct Harness {
    lifecycle: Arc<TestLifecycle>,
    bookings: Arc<InMemoryBookings>,
}

/// Lifecycle wired against one venue, clock pinned to `now`
fn harness(venue: Venue, now: DateTime<Utc>) -> Harness {
    let bookings = Arc::new(InMemoryBookings::default());
    let venues = Arc::new(InMemoryVenues {
        venues: HashMap::from([(venue.id, venue.clone())]),
    });
    let (tx, _rx) = event_channel();

    let lifecycle = Arc::new(BookingLifecycle::new(
        bookings.clone(),
        venues,
        Arc::new(FixedClock(now)),
        DurationLimits::default(),
        tx,
    ));

    Harness {
        lifecycle,
        bookings,
    }
}

/// Tuesday 2025-06-10; slots start at 18:00 in most tests
fn slot_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
}

fn slot_start() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap()
}

/// Clock `hours_before` the 18:00 slot start
fn clock_before_slot(hours_before: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 18, 0, 0).unwrap() - Duration::hours(hours_before)
}

fn create_request(venue_id: Uuid, start: NaiveTime, duration: Decimal) -> CreateBooking {
    CreateBooking {
        venue_id,
        user_id: Uuid::new_v4(),
        date: slot_date(),
        slot_start: start,
        duration_hours: duration,
        customer: CustomerDetails {
            name: "Asha".to_string(),
            phone: Some("9800000000".to_string()),
        },
    }
}

// ==================== Mutual exclusion ====================

#[tokio::test]
async fn concurrent_creates_admit_exactly_one_winner() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let lifecycle = h.lifecycle.clone();
        let request = create_request(venue.id, slot_start(), dec!(1));
        tasks.push(tokio::spawn(
            async move { lifecycle.create(request).await },
        ));
    }

    let mut winners = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(booking) => {
                assert_eq!(booking.status, BookingStatus::Pending);
                winners += 1;
            }
            Err(AppError::SlotConflict { date, start }) => {
                assert_eq!(date, slot_date());
                assert_eq!(start, slot_start());
                conflicts += 1;
            }
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn cancelled_slot_can_be_rebooked() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    let first = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();
    h.lifecycle
        .cancel(first.id, first.user_id, None)
        .await
        .unwrap();

    // The slot frees up once the original booking is cancelled
    let second = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();
    assert_ne!(second.id, first.id);
}

// ==================== End-to-end scenario ====================

#[tokio::test]
async fn booking_scenario_create_conflict_cancel() {
    let venue = test_venue(
        dec!(2000),
        PriceMultipliers {
            evening: Some(dec!(1.0)),
            ..Default::default()
        },
    );
    let h = harness(venue.clone(), clock_before_slot(25));

    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();

    assert_eq!(booking.total_amount, dec!(2000));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.reference, 1);
    assert_eq!(booking.formatted_reference(), "TB-000001");

    let conflict = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await;
    assert!(matches!(conflict, Err(AppError::SlotConflict { .. })));

    // Cancelling 25h ahead refunds everything
    let result = h
        .lifecycle
        .cancel(booking.id, booking.user_id, Some("rain".to_string()))
        .await
        .unwrap();

    assert_eq!(result.refund.amount, dec!(2000));
    assert_eq!(result.refund.percentage, 100);
    assert_eq!(result.booking.status, BookingStatus::Cancelled);

    let record = result.booking.cancellation.unwrap();
    assert_eq!(record.refund_amount, dec!(2000));
    assert_eq!(record.reason.as_deref(), Some("rain"));
}

#[tokio::test]
async fn refund_tiers_through_lifecycle() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());

    // 13h ahead: 80%
    let h = harness(venue.clone(), clock_before_slot(13));
    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();
    let result = h
        .lifecycle
        .cancel(booking.id, booking.user_id, None)
        .await
        .unwrap();
    assert_eq!(result.refund.percentage, 80);
    assert_eq!(result.refund.amount, dec!(1600));

    // 3h ahead: 50%
    let h = harness(venue.clone(), clock_before_slot(3));
    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();
    let result = h
        .lifecycle
        .cancel(booking.id, booking.user_id, None)
        .await
        .unwrap();
    assert_eq!(result.refund.percentage, 50);
    assert_eq!(result.refund.amount, dec!(1000));

    // One hour ahead: inside the minimum notice, refused
    let h = harness(venue.clone(), clock_before_slot(1));
    let booking = {
        // Create earlier so only the cancellation is inside the window
        let early = harness(venue.clone(), clock_before_slot(25));
        let b = early
            .lifecycle
            .create(create_request(venue.id, slot_start(), dec!(1)))
            .await
            .unwrap();
        h.bookings.insert_if_slot_free(&b).await.unwrap();
        b
    };
    let denied = h.lifecycle.cancel(booking.id, booking.user_id, None).await;
    assert!(matches!(denied, Err(AppError::NotCancellable(_))));
}

// ==================== State machine guards ====================

#[tokio::test]
async fn confirm_complete_flow_with_idempotency_guards() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();

    let confirmed = h.lifecycle.confirm_payment(booking.id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // Confirming twice fails
    let again = h.lifecycle.confirm_payment(booking.id).await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));

    let completed = h.lifecycle.complete(booking.id).await.unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    // Completing twice fails, it does not silently succeed
    let again = h.lifecycle.complete(booking.id).await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));

    // Terminal state rejects cancellation
    let cancel = h.lifecycle.cancel(booking.id, booking.user_id, None).await;
    assert!(matches!(cancel, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn cancelling_twice_fails_and_preserves_the_record() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();

    let first = h
        .lifecycle
        .cancel(booking.id, booking.user_id, Some("first".to_string()))
        .await
        .unwrap();
    assert_eq!(first.refund.percentage, 100);

    let second = h
        .lifecycle
        .cancel(booking.id, booking.user_id, Some("second".to_string()))
        .await;
    assert!(matches!(second, Err(AppError::AlreadyCancelled(_))));

    // The original cancellation record is untouched
    let stored = h
        .bookings
        .find_by_id(booking.id)
        .await
        .unwrap()
        .unwrap();
    let record = stored.cancellation.unwrap();
    assert_eq!(record.reason.as_deref(), Some("first"));
    assert_eq!(record.refund_amount, dec!(2000));
}

#[tokio::test]
async fn pending_booking_cannot_complete() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    let booking = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();

    let result = h.lifecycle.complete(booking.id).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
}

// ==================== Creation validation ====================

#[tokio::test]
async fn create_validation_rejects_bad_requests() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    // Duration below minimum
    let r = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(0.25)))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Duration above maximum
    let r = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(9)))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Duration off the half-hour grid
    let r = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1.3)))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Slot before opening
    let r = h
        .lifecycle
        .create(create_request(
            venue.id,
            NaiveTime::from_hms_opt(5, 0, 0).unwrap(),
            dec!(1),
        ))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Slot start not hour aligned
    let r = h
        .lifecycle
        .create(create_request(
            venue.id,
            NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            dec!(1),
        ))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Booking would extend past closing (21:00 + 2h, closes 22:00)
    let r = h
        .lifecycle
        .create(create_request(
            venue.id,
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            dec!(2),
        ))
        .await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // Unknown venue
    let r = h
        .lifecycle
        .create(create_request(Uuid::new_v4(), slot_start(), dec!(1)))
        .await;
    assert!(matches!(r, Err(AppError::VenueNotFound(_))));
}

#[tokio::test]
async fn create_respects_closed_days_and_booking_window() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));

    // 2025-06-15 is a Sunday, closed in the fixture
    let mut request = create_request(venue.id, slot_start(), dec!(1));
    request.date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let r = h.lifecycle.create(request).await;
    assert!(matches!(r, Err(AppError::VenueClosed(_))));

    // Beyond the 30-day advance window
    let mut request = create_request(venue.id, slot_start(), dec!(1));
    request.date = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
    let r = h.lifecycle.create(request).await;
    assert!(matches!(r, Err(AppError::Validation(_))));

    // In the past (2025-06-05 is a Thursday, so the date check decides)
    let mut request = create_request(venue.id, slot_start(), dec!(1));
    request.date = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
    let r = h.lifecycle.create(request).await;
    assert!(matches!(r, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn inactive_venue_rejects_bookings() {
    let mut venue = test_venue(dec!(2000), PriceMultipliers::default());
    venue.is_active = false;
    let h = harness(venue.clone(), clock_before_slot(25));

    let r = h
        .lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await;
    assert!(matches!(r, Err(AppError::VenueClosed(_))));
}

// ==================== Calendar ====================

#[tokio::test]
async fn calendar_marks_taken_slots_and_stays_deterministic() {
    let venue = test_venue(
        dec!(2000),
        PriceMultipliers {
            evening: Some(dec!(1.2)),
            ..Default::default()
        },
    );
    let h = harness(venue.clone(), clock_before_slot(25));
    let calendar = VenueCalendar::new(h.bookings.clone());

    h.lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();

    let slots = calendar.available_slots(&venue, slot_date()).await.unwrap();

    // Open 06:00-22:00 means 16 hourly slots
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0].start, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
    assert_eq!(slots[0].price, dec!(2000));

    let evening = slots.iter().find(|s| s.start == slot_start()).unwrap();
    assert!(!evening.available);
    assert_eq!(evening.price, dec!(2400));

    let free = slots
        .iter()
        .filter(|s| s.available)
        .count();
    assert_eq!(free, 15);

    // Identical inputs, identical output
    let again = calendar.available_slots(&venue, slot_date()).await.unwrap();
    assert_eq!(again, slots);
}

#[tokio::test]
async fn calendar_returns_empty_for_closed_weekday() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());
    let h = harness(venue.clone(), clock_before_slot(25));
    let calendar = VenueCalendar::new(h.bookings);

    // Sunday is closed in the fixture
    let sunday = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    let slots = calendar.available_slots(&venue, sunday).await.unwrap();
    assert!(slots.is_empty());
}

// ==================== Stats aggregation ====================

#[tokio::test]
async fn aggregator_consumes_created_and_cancelled_events() {
    let venue = test_venue(dec!(2000), PriceMultipliers::default());

    let bookings = Arc::new(InMemoryBookings::default());
    let venues = Arc::new(InMemoryVenues {
        venues: HashMap::from([(venue.id, venue.clone())]),
    });
    let stats = Arc::new(CountingStats::default());
    let (tx, rx) = event_channel();
    let aggregator = StatsAggregator::spawn(stats.clone(), rx);

    let lifecycle = BookingLifecycle::new(
        bookings,
        venues,
        Arc::new(FixedClock(clock_before_slot(25))),
        DurationLimits::default(),
        tx,
    );

    let booking = lifecycle
        .create(create_request(venue.id, slot_start(), dec!(1)))
        .await
        .unwrap();
    lifecycle
        .cancel(booking.id, booking.user_id, None)
        .await
        .unwrap();

    // Dropping the lifecycle closes the channel; the aggregator drains
    // whatever is queued before stopping.
    drop(lifecycle);
    aggregator.await.unwrap();

    assert_eq!(stats.created.load(Ordering::SeqCst), 1);
    assert_eq!(stats.cancelled.load(Ordering::SeqCst), 1);
}

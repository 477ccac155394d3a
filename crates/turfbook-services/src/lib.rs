//! Business logic services for Turfbook
//!
//! This crate contains the services that orchestrate slot booking:
//! deriving a venue's bookable calendar, atomically claiming slots, and
//! driving the booking state machine with cancellation refunds.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its dependencies (repositories, clock) behind traits
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Services
//!
//! - `VenueCalendar` - derives available time slots from venue hours and
//!   existing bookings
//! - `SlotAllocator` - the concurrency-critical atomic slot claim
//! - `BookingLifecycle` - create/confirm/cancel/complete state machine
//! - `StatsAggregator` - consumes booking events and maintains aggregate
//!   venue/user counters off the hot path

pub mod allocator;
pub mod calendar;
pub mod lifecycle;
pub mod stats;

pub use allocator::SlotAllocator;
pub use calendar::VenueCalendar;
pub use lifecycle::{BookingLifecycle, CancelResult, CreateBooking, DurationLimits};
pub use stats::{BookingEvent, StatsAggregator};

/// Business logic constants
pub mod constants {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    /// Minimum booking duration in hours
    pub const MIN_DURATION_HOURS: Decimal = dec!(0.5);

    /// Maximum booking duration in hours
    pub const MAX_DURATION_HOURS: Decimal = dec!(8);

    /// Booking duration step in hours
    pub const DURATION_STEP_HOURS: Decimal = dec!(0.5);

    /// Length of one bookable slot in hours
    pub const SLOT_LENGTH_HOURS: u32 = 1;
}

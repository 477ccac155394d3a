//! Domain models for Turfbook

pub mod booking;
pub mod slot;
pub mod venue;

pub use booking::{
    Booking, BookingReview, BookingStatus, CancellationRecord, CustomerDetails, PaymentStatus,
};
pub use slot::TimeSlot;
pub use venue::{DayHours, PriceMultipliers, Venue, WeeklyHours};

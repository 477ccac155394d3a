//! HTTP handlers

pub mod bookings;
pub mod venues;

pub use bookings::configure as configure_bookings;
pub use venues::configure as configure_venues;

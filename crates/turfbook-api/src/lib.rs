//! API layer for Turfbook
//!
//! HTTP handlers for slot availability, booking creation, and the booking
//! lifecycle endpoints.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

use turfbook_core::SystemClock;
use turfbook_db::{PgBookingRepository, PgVenueRepository};
use turfbook_services::{BookingLifecycle, VenueCalendar};

/// Booking lifecycle wired against the PostgreSQL repositories
pub type AppLifecycle = BookingLifecycle<PgBookingRepository, PgVenueRepository, SystemClock>;

/// Venue calendar wired against the PostgreSQL repositories
pub type AppCalendar = VenueCalendar<PgBookingRepository>;

pub use handlers::{configure_bookings, configure_venues};

//! Repository implementations

pub mod booking_repo;
pub mod stats_repo;
pub mod venue_repo;

pub use booking_repo::PgBookingRepository;
pub use stats_repo::PgStatsRepository;
pub use venue_repo::PgVenueRepository;

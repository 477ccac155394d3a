//! Request and response DTOs

pub mod booking;
pub mod slot;
pub mod venue;

pub use booking::{
    BookingListQuery, BookingResponse, CancelBookingRequest, CancelResponse, CreateBookingRequest,
};
pub use slot::{SlotQuery, SlotResponse};
pub use venue::VenueResponse;

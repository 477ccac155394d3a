//! Turfbook Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the Turfbook booking engine. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for venues, bookings, and stats counters
//! - The slot-exclusivity invariant enforced by a partial unique index and
//!   a conditional insert (never a check-then-act sequence)

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::{PgPool, Postgres, Transaction};
pub use turfbook_core::{AppError, AppResult};

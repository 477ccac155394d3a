//! Common traits for repositories
//!
//! Defines abstractions for the persistent store the booking engine runs
//! against. The single write primitive that protects the slot-exclusivity
//! invariant is `BookingRepository::insert_if_slot_free`.

use crate::error::AppError;
use crate::models::{Booking, BookingStatus, Venue};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Booking repository
///
/// Implementations must make `insert_if_slot_free` atomic with respect to
/// concurrent callers: out of any set of simultaneous inserts for the same
/// (venue, date, slot start), exactly one may succeed. A read-then-insert
/// sequence is not an acceptable implementation.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find booking by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError>;

    /// Insert the booking unless its slot is already held
    ///
    /// Returns `None` when a non-cancelled booking already occupies
    /// (venue_id, date, slot_start). On success the returned booking carries
    /// its store-assigned sequential reference.
    async fn insert_if_slot_free(&self, booking: &Booking) -> Result<Option<Booking>, AppError>;

    /// All slot-holding (non-cancelled) bookings for a venue and date
    async fn find_holding_slots(
        &self,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, AppError>;

    /// Persist a mutated booking, guarded by its expected current status
    ///
    /// Compare-and-swap: the update applies only while the stored status
    /// still equals `expected`. Returns `None` when another writer got
    /// there first.
    async fn update_if_status(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> Result<Option<Booking>, AppError>;

    /// List bookings with optional filters, newest first
    async fn list_filtered(
        &self,
        venue_id: Option<Uuid>,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;
}

/// Venue repository
///
/// The booking engine only reads venues; venue CRUD lives elsewhere.
#[async_trait]
pub trait VenueRepository: Send + Sync {
    /// Find venue by ID, with operating hours resolved
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Venue>, AppError>;
}

/// Aggregate-counter repository, driven by the stats aggregator
///
/// Soft bookkeeping only; failures here must never fail a booking operation.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Record a created booking against venue and user counters
    async fn record_created(
        &self,
        venue_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<(), AppError>;

    /// Record a cancellation against venue and user counters
    async fn record_cancelled(
        &self,
        venue_id: Uuid,
        user_id: Uuid,
        refund_amount: Decimal,
    ) -> Result<(), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 2000); // per_page capped at 1000
        assert_eq!(p.per_page, 1000);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }
}

//! Booking repository implementation
//!
//! Provides PostgreSQL-backed storage for bookings. Slot exclusivity is
//! enforced here: `insert_if_slot_free` is a single conditional insert
//! against the partial unique index on (venue_id, slot_date, slot_start)
//! over non-cancelled rows, so two concurrent claims for the same slot can
//! never both commit.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use turfbook_core::{
    models::{
        Booking, BookingReview, BookingStatus, CancellationRecord, CustomerDetails, PaymentStatus,
    },
    traits::BookingRepository,
    AppError, AppResult,
};
use uuid::Uuid;

/// Column list shared by every booking query
const BOOKING_COLUMNS: &str = r#"
    id, reference, venue_id, user_id, slot_date, slot_start,
    duration_hours, total_amount, currency, status, payment_status,
    customer_name, customer_phone,
    cancelled_at, cancelled_by, cancellation_reason,
    refund_amount, refund_percentage,
    review_rating, review_comment,
    created_at, updated_at
"#;

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse booking status from string
    fn parse_status(s: &str) -> BookingStatus {
        BookingStatus::from_str(s).unwrap_or(BookingStatus::Pending)
    }

    /// Parse payment status from string
    fn parse_payment_status(s: &str) -> PaymentStatus {
        PaymentStatus::from_str(s).unwrap_or(PaymentStatus::Pending)
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        debug!("Finding booking by id: {}", id);

        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);

        let result = sqlx::query_as::<sqlx::Postgres, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding booking {}: {}", id, e);
                AppError::Database(format!("Failed to find booking: {}", e))
            })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self, booking))]
    async fn insert_if_slot_free(&self, booking: &Booking) -> AppResult<Option<Booking>> {
        debug!(
            "Claiming slot {} {} at venue {}",
            booking.date, booking.slot_start, booking.venue_id
        );

        // Conditional insert: the partial unique index arbitrates between
        // concurrent claims, zero rows back means the slot was taken.
        let sql = format!(
            r#"
            INSERT INTO bookings (
                id, venue_id, user_id, slot_date, slot_start, duration_hours,
                total_amount, currency, status, payment_status,
                customer_name, customer_phone, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (venue_id, slot_date, slot_start) WHERE status <> 'cancelled'
            DO NOTHING
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&sql)
            .bind(booking.id)
            .bind(booking.venue_id)
            .bind(booking.user_id)
            .bind(booking.date)
            .bind(booking.slot_start)
            .bind(booking.duration_hours)
            .bind(booking.total_amount)
            .bind(&booking.currency)
            .bind(booking.status.to_string())
            .bind(booking.payment_status.to_string())
            .bind(&booking.customer.name)
            .bind(&booking.customer.phone)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error claiming slot: {}", e);
                AppError::Database(format!("Failed to create booking: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn find_holding_slots(
        &self,
        venue_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Booking>> {
        debug!("Finding held slots for venue {} on {}", venue_id, date);

        let sql = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE venue_id = $1
                AND slot_date = $2
                AND status <> 'cancelled'
            ORDER BY slot_start
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&sql)
            .bind(venue_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding held slots: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, booking))]
    async fn update_if_status(
        &self,
        booking: &Booking,
        expected: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        debug!(
            "Updating booking {} (expected status {})",
            booking.id, expected
        );

        let (cancelled_at, cancelled_by, cancellation_reason, refund_amount, refund_percentage) =
            match &booking.cancellation {
                Some(c) => (
                    Some(c.cancelled_at),
                    Some(c.cancelled_by),
                    c.reason.clone(),
                    Some(c.refund_amount),
                    Some(c.refund_percentage as i32),
                ),
                None => (None, None, None, None, None),
            };

        let (review_rating, review_comment) = match &booking.review {
            Some(r) => (Some(r.rating), r.comment.clone()),
            None => (None, None),
        };

        let sql = format!(
            r#"
            UPDATE bookings
            SET status = $3,
                payment_status = $4,
                cancelled_at = $5,
                cancelled_by = $6,
                cancellation_reason = $7,
                refund_amount = $8,
                refund_percentage = $9,
                review_rating = $10,
                review_comment = $11,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query_as::<sqlx::Postgres, BookingRow>(&sql)
            .bind(booking.id)
            .bind(expected.to_string())
            .bind(booking.status.to_string())
            .bind(booking.payment_status.to_string())
            .bind(cancelled_at)
            .bind(cancelled_by)
            .bind(cancellation_reason)
            .bind(refund_amount)
            .bind(refund_percentage)
            .bind(review_rating)
            .bind(review_comment)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error updating booking {}: {}", booking.id, e);
                AppError::Database(format!("Failed to update booking: {}", e))
            })?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_filtered(
        &self,
        venue_id: Option<Uuid>,
        date: Option<NaiveDate>,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        debug!(
            "Listing bookings venue={:?} date={:?} status={:?}",
            venue_id, date, status
        );

        let status_str = status.map(|s| s.to_string());

        let sql = format!(
            r#"
            SELECT {}
            FROM bookings
            WHERE ($1::uuid IS NULL OR venue_id = $1)
                AND ($2::date IS NULL OR slot_date = $2)
                AND ($3::varchar IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
            BOOKING_COLUMNS
        );

        let rows = sqlx::query_as::<sqlx::Postgres, BookingRow>(&sql)
            .bind(venue_id)
            .bind(date)
            .bind(&status_str)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error listing bookings: {}", e);
                AppError::Database(format!("Failed to fetch bookings: {}", e))
            })?;

        let total: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM bookings
            WHERE ($1::uuid IS NULL OR venue_id = $1)
                AND ($2::date IS NULL OR slot_date = $2)
                AND ($3::varchar IS NULL OR status = $3)
            "#,
        )
        .bind(venue_id)
        .bind(date)
        .bind(&status_str)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting bookings: {}", e);
            AppError::Database(format!("Failed to count bookings: {}", e))
        })?;

        Ok((rows.into_iter().map(Into::into).collect(), total.0))
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: i64,
    venue_id: Uuid,
    user_id: Uuid,
    slot_date: NaiveDate,
    slot_start: NaiveTime,
    duration_hours: Decimal,
    total_amount: Decimal,
    currency: String,
    status: String,
    payment_status: String,
    customer_name: String,
    customer_phone: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<Uuid>,
    cancellation_reason: Option<String>,
    refund_amount: Option<Decimal>,
    refund_percentage: Option<i32>,
    review_rating: Option<i16>,
    review_comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        let cancellation = match (row.cancelled_at, row.cancelled_by) {
            (Some(cancelled_at), Some(cancelled_by)) => Some(CancellationRecord {
                cancelled_at,
                cancelled_by,
                reason: row.cancellation_reason,
                refund_amount: row.refund_amount.unwrap_or(Decimal::ZERO),
                refund_percentage: row.refund_percentage.unwrap_or(0).max(0) as u32,
            }),
            _ => None,
        };

        let review = row.review_rating.map(|rating| BookingReview {
            rating,
            comment: row.review_comment,
        });

        Self {
            id: row.id,
            reference: row.reference,
            venue_id: row.venue_id,
            user_id: row.user_id,
            date: row.slot_date,
            slot_start: row.slot_start,
            duration_hours: row.duration_hours,
            total_amount: row.total_amount,
            currency: row.currency,
            status: PgBookingRepository::parse_status(&row.status),
            payment_status: PgBookingRepository::parse_payment_status(&row.payment_status),
            customer: CustomerDetails {
                name: row.customer_name,
                phone: row.customer_phone,
            },
            cancellation,
            review,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

//! Venue repository implementation
//!
//! Read-only access to venue configuration: pricing, operating hours, and
//! cancellation terms. Venue CRUD belongs to the admin surface, not this
//! engine.

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use turfbook_core::{
    cancellation::CancellationTerms,
    models::{DayHours, PriceMultipliers, Venue, WeeklyHours},
    traits::VenueRepository,
    AppError, AppResult,
};
use uuid::Uuid;

/// PostgreSQL implementation of VenueRepository
pub struct PgVenueRepository {
    pool: PgPool,
    default_terms: CancellationTerms,
}

impl PgVenueRepository {
    /// Create a new venue repository
    ///
    /// `default_terms` fills in cancellation thresholds for venues that
    /// carry no overrides of their own.
    pub fn new(pool: PgPool, default_terms: CancellationTerms) -> Self {
        Self {
            pool,
            default_terms,
        }
    }
}

#[async_trait]
impl VenueRepository for PgVenueRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Venue>> {
        debug!("Finding venue by id: {}", id);

        let venue_row = sqlx::query_as::<sqlx::Postgres, VenueRow>(
            r#"
            SELECT
                id, name, base_price, currency,
                morning_multiplier, afternoon_multiplier,
                evening_multiplier, night_multiplier,
                min_duration_hours, advance_booking_days,
                min_cancel_notice_hours, full_refund_hours, high_refund_hours,
                is_active, total_bookings, total_revenue,
                created_at, updated_at
            FROM venues
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding venue {}: {}", id, e);
            AppError::Database(format!("Failed to find venue: {}", e))
        })?;

        let Some(venue_row) = venue_row else {
            return Ok(None);
        };

        let hour_rows = sqlx::query_as::<sqlx::Postgres, VenueHoursRow>(
            r#"
            SELECT weekday, open_time, close_time, closed
            FROM venue_hours
            WHERE venue_id = $1
            ORDER BY weekday
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error loading venue hours {}: {}", id, e);
            AppError::Database(format!("Failed to load venue hours: {}", e))
        })?;

        // Days without a row stay closed
        let mut days = [DayHours::closed(); 7];
        for row in hour_rows {
            let idx = row.weekday as usize;
            if idx < 7 {
                days[idx] = if row.closed {
                    DayHours::closed()
                } else {
                    DayHours::open(row.open_time, row.close_time)
                };
            }
        }

        Ok(Some(
            venue_row.into_venue(WeeklyHours::new(days), self.default_terms),
        ))
    }
}

/// Helper struct for mapping venue rows
#[derive(Debug, sqlx::FromRow)]
struct VenueRow {
    id: Uuid,
    name: String,
    base_price: Decimal,
    currency: String,
    morning_multiplier: Option<Decimal>,
    afternoon_multiplier: Option<Decimal>,
    evening_multiplier: Option<Decimal>,
    night_multiplier: Option<Decimal>,
    min_duration_hours: Decimal,
    advance_booking_days: i64,
    min_cancel_notice_hours: Option<i64>,
    full_refund_hours: Option<i64>,
    high_refund_hours: Option<i64>,
    is_active: bool,
    total_bookings: i64,
    total_revenue: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VenueRow {
    fn into_venue(self, hours: WeeklyHours, defaults: CancellationTerms) -> Venue {
        Venue {
            id: self.id,
            name: self.name,
            base_price: self.base_price,
            currency: self.currency,
            multipliers: PriceMultipliers {
                morning: self.morning_multiplier,
                afternoon: self.afternoon_multiplier,
                evening: self.evening_multiplier,
                night: self.night_multiplier,
            },
            hours,
            min_duration_hours: self.min_duration_hours,
            advance_booking_days: self.advance_booking_days,
            cancellation: CancellationTerms {
                min_notice_hours: self.min_cancel_notice_hours.unwrap_or(defaults.min_notice_hours),
                full_refund_hours: self.full_refund_hours.unwrap_or(defaults.full_refund_hours),
                high_refund_hours: self.high_refund_hours.unwrap_or(defaults.high_refund_hours),
            },
            is_active: self.is_active,
            total_bookings: self.total_bookings,
            total_revenue: self.total_revenue,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Helper struct for mapping venue hour rows
#[derive(Debug, sqlx::FromRow)]
struct VenueHoursRow {
    weekday: i16,
    open_time: NaiveTime,
    close_time: NaiveTime,
    closed: bool,
}

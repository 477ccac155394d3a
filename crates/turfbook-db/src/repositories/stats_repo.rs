//! Aggregate-counter repository implementation
//!
//! Applies venue and user counter deltas for the stats aggregator. These
//! are soft counters: the booking path never waits on them, and a failed
//! delta is logged upstream rather than surfaced to the caller.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use turfbook_core::{traits::StatsRepository, AppError, AppResult};
use uuid::Uuid;

/// PostgreSQL implementation of StatsRepository
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    /// Create a new stats repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    #[instrument(skip(self))]
    async fn record_created(
        &self,
        venue_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<()> {
        debug!("Recording created booking for venue {}", venue_id);

        sqlx::query(
            r#"
            UPDATE venues
            SET total_bookings = total_bookings + 1,
                total_revenue = total_revenue + $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(venue_id)
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating venue counters: {}", e);
            AppError::Database(format!("Failed to update venue counters: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, total_bookings, total_spent)
            VALUES ($1, 1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET total_bookings = user_stats.total_bookings + 1,
                total_spent = user_stats.total_spent + $2,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating user counters: {}", e);
            AppError::Database(format!("Failed to update user counters: {}", e))
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_cancelled(
        &self,
        venue_id: Uuid,
        user_id: Uuid,
        refund_amount: Decimal,
    ) -> AppResult<()> {
        debug!("Recording cancelled booking for venue {}", venue_id);

        sqlx::query(
            r#"
            UPDATE venues
            SET total_bookings = total_bookings - 1,
                total_revenue = total_revenue - $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(venue_id)
        .bind(refund_amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating venue counters: {}", e);
            AppError::Database(format!("Failed to update venue counters: {}", e))
        })?;

        sqlx::query(
            r#"
            UPDATE user_stats
            SET total_bookings = total_bookings - 1,
                total_spent = total_spent - $2,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(refund_amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error updating user counters: {}", e);
            AppError::Database(format!("Failed to update user counters: {}", e))
        })?;

        Ok(())
    }
}

//! Booking event fan-out and stats aggregation
//!
//! The lifecycle emits events instead of mutating venue/user counters
//! inline, keeping the slot-exclusivity invariant decoupled from soft
//! bookkeeping. A single aggregator task drains the channel and applies
//! counter deltas; failures are logged and never propagate back into the
//! booking path.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use turfbook_core::traits::StatsRepository;
use uuid::Uuid;

/// Event emitted by the booking lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    /// A booking was created
    Created {
        booking_id: Uuid,
        venue_id: Uuid,
        user_id: Uuid,
        amount: Decimal,
    },
    /// A booking was cancelled
    Cancelled {
        booking_id: Uuid,
        venue_id: Uuid,
        user_id: Uuid,
        refund_amount: Decimal,
    },
}

/// Create the event channel shared by lifecycle and aggregator
pub fn event_channel() -> (UnboundedSender<BookingEvent>, UnboundedReceiver<BookingEvent>) {
    mpsc::unbounded_channel()
}

/// Aggregates booking events into venue/user counters
pub struct StatsAggregator;

impl StatsAggregator {
    /// Spawn the aggregation task
    ///
    /// Runs until the sending side of the channel is dropped.
    pub fn spawn<S>(stats: Arc<S>, mut events: UnboundedReceiver<BookingEvent>) -> JoinHandle<()>
    where
        S: StatsRepository + 'static,
    {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                debug!("Aggregating event: {:?}", event);

                let result = match &event {
                    BookingEvent::Created {
                        venue_id,
                        user_id,
                        amount,
                        ..
                    } => stats.record_created(*venue_id, *user_id, *amount).await,
                    BookingEvent::Cancelled {
                        venue_id,
                        user_id,
                        refund_amount,
                        ..
                    } => {
                        stats
                            .record_cancelled(*venue_id, *user_id, *refund_amount)
                            .await
                    }
                };

                if let Err(e) = result {
                    warn!("Stats aggregation failed for {:?}: {}", event, e);
                }
            }

            debug!("Stats channel closed, aggregator stopping");
        })
    }
}

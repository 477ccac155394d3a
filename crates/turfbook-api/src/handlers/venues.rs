//! Venue handlers
//!
//! HTTP handlers for venue summaries and slot availability.

use crate::dto::{SlotQuery, SlotResponse, VenueResponse};
use crate::AppCalendar;
use actix_web::{web, HttpResponse};
use tracing::{debug, instrument};
use turfbook_core::{traits::VenueRepository, AppError};
use turfbook_db::PgVenueRepository;
use uuid::Uuid;

/// Fetch a venue summary
///
/// GET /api/v1/venues/{venue_id}
#[instrument(skip(venues))]
pub async fn get_venue(
    venues: web::Data<PgVenueRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let venue = venues
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::VenueNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(VenueResponse::from(venue)))
}

/// List available slots for a venue on a date
///
/// GET /api/v1/venues/{venue_id}/slots?date=YYYY-MM-DD
#[instrument(skip(venues, calendar))]
pub async fn get_available_slots(
    venues: web::Data<PgVenueRepository>,
    calendar: web::Data<AppCalendar>,
    path: web::Path<Uuid>,
    query: web::Query<SlotQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    debug!("Listing slots for venue {} on {}", id, query.date);

    let venue = venues
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::VenueNotFound(id.to_string()))?;

    let slots = calendar.available_slots(&venue, query.date).await?;
    let response: Vec<SlotResponse> = slots.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(response))
}

/// Configure venue routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/venues")
            .route("/{venue_id}", web::get().to(get_venue))
            .route("/{venue_id}/slots", web::get().to(get_available_slots)),
    );
}

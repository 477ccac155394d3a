//! Booking handlers
//!
//! HTTP handlers for booking creation and the lifecycle endpoints.

use crate::dto::{
    BookingListQuery, BookingResponse, CancelBookingRequest, CancelResponse, CreateBookingRequest,
};
use crate::AppLifecycle;
use actix_web::{web, HttpResponse};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use tracing::{debug, instrument};
use turfbook_core::{
    models::BookingStatus,
    traits::{BookingRepository, PaginatedResponse, Pagination, PaginationMeta},
    AppError,
};
use turfbook_db::PgBookingRepository;
use uuid::Uuid;
use validator::Validate;

/// Parse an "HH:MM" slot start
fn parse_slot_start(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid slot start time: {}", raw)))
}

/// Create a booking
///
/// POST /api/v1/bookings
#[instrument(skip(lifecycle, payload))]
pub async fn create_booking(
    lifecycle: web::Data<AppLifecycle>,
    payload: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    request.validate()?;

    let slot_start = parse_slot_start(&request.slot_start)?;
    let duration_hours = Decimal::try_from(request.duration_hours)
        .map_err(|_| AppError::Validation("duration is not a valid number".to_string()))?;

    debug!(
        "Creating booking at venue {} on {} {}",
        request.venue_id, request.date, slot_start
    );

    let booking = lifecycle
        .create(turfbook_services::CreateBooking {
            venue_id: request.venue_id,
            user_id: request.user_id,
            date: request.date,
            slot_start,
            duration_hours,
            customer: turfbook_core::models::CustomerDetails {
                name: request.customer.name,
                phone: request.customer.phone,
            },
        })
        .await?;

    Ok(HttpResponse::Created().json(BookingResponse::from(booking)))
}

/// Fetch one booking
///
/// GET /api/v1/bookings/{id}
#[instrument(skip(bookings))]
pub async fn get_booking(
    bookings: web::Data<PgBookingRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let booking = bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

/// List bookings with optional filters
///
/// GET /api/v1/bookings
#[instrument(skip(bookings))]
pub async fn list_bookings(
    bookings: web::Data<PgBookingRepository>,
    query: web::Query<BookingListQuery>,
) -> Result<HttpResponse, AppError> {
    debug!("Listing bookings with filters: {:?}", query);

    let status = match &query.status {
        Some(raw) => Some(
            BookingStatus::from_str(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {}", raw)))?,
        ),
        None => None,
    };

    let pagination = Pagination::new(query.page, query.per_page);
    let (items, total) = bookings
        .list_filtered(
            query.venue_id,
            query.date,
            status,
            pagination.limit(),
            pagination.offset(),
        )
        .await?;

    let response = PaginatedResponse {
        data: items
            .into_iter()
            .map(BookingResponse::from)
            .collect::<Vec<_>>(),
        pagination: PaginationMeta::new(total, pagination.page, pagination.per_page),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Confirm payment for a booking
///
/// POST /api/v1/bookings/{id}/confirm
#[instrument(skip(lifecycle))]
pub async fn confirm_booking(
    lifecycle: web::Data<AppLifecycle>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking = lifecycle.confirm_payment(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

/// Cancel a booking and compute the refund
///
/// DELETE /api/v1/bookings/{id}
#[instrument(skip(lifecycle, payload))]
pub async fn cancel_booking(
    lifecycle: web::Data<AppLifecycle>,
    path: web::Path<Uuid>,
    payload: web::Json<CancelBookingRequest>,
) -> Result<HttpResponse, AppError> {
    let request = payload.into_inner();
    request.validate()?;

    let result = lifecycle
        .cancel(path.into_inner(), request.cancelled_by, request.reason)
        .await?;

    Ok(HttpResponse::Ok().json(CancelResponse::from(result.refund)))
}

/// Mark a booking as completed
///
/// POST /api/v1/bookings/{id}/complete
#[instrument(skip(lifecycle))]
pub async fn complete_booking(
    lifecycle: web::Data<AppLifecycle>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let booking = lifecycle.complete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/bookings")
            .route("", web::post().to(create_booking))
            .route("", web::get().to(list_bookings))
            .route("/{id}", web::get().to(get_booking))
            .route("/{id}", web::delete().to(cancel_booking))
            .route("/{id}/confirm", web::post().to(confirm_booking))
            .route("/{id}/complete", web::post().to(complete_booking)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_start() {
        assert_eq!(
            parse_slot_start("18:00").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
        assert!(parse_slot_start("25:00").is_err());
        assert!(parse_slot_start("six pm").is_err());
    }
}

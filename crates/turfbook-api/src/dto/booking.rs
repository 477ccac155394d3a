//! Booking DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use turfbook_core::cancellation::Refund;
use turfbook_core::models::Booking;
use uuid::Uuid;
use validator::Validate;

/// Request body for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// Venue to book
    pub venue_id: Uuid,

    /// Authenticated user making the booking
    pub user_id: Uuid,

    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,

    /// Slot start time, "HH:MM"
    pub slot_start: String,

    /// Duration in hours
    #[validate(range(min = 0.5, max = 8.0))]
    pub duration_hours: f64,

    /// Customer details
    #[validate(nested)]
    pub customer: CustomerDto,
}

/// Customer details on a booking request
#[derive(Debug, Deserialize, Validate)]
pub struct CustomerDto {
    /// Customer display name
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    /// Contact phone
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

/// Request body for cancelling a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CancelBookingRequest {
    /// Who is cancelling (the booking owner)
    pub cancelled_by: Uuid,

    /// Optional free-text reason
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Query parameters for listing bookings
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub venue_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,

    #[serde(default = "default_page")]
    pub page: i64,

    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

/// Booking response DTO
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub reference: String,
    pub venue_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub slot_start: String,
    pub end_time: String,
    pub duration_hours: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_status: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cancellation details on a booking response
#[derive(Debug, Serialize)]
pub struct CancellationResponse {
    pub cancelled_at: DateTime<Utc>,
    pub cancelled_by: Uuid,
    pub reason: Option<String>,
    pub refund_amount: Decimal,
    pub refund_percentage: u32,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            reference: booking.formatted_reference(),
            venue_id: booking.venue_id,
            user_id: booking.user_id,
            date: booking.date,
            slot_start: booking.slot_start.format("%H:%M").to_string(),
            end_time: booking.end_time().format("%H:%M").to_string(),
            duration_hours: booking.duration_hours,
            total_amount: booking.total_amount,
            currency: booking.currency.clone(),
            status: booking.status.to_string(),
            payment_status: booking.payment_status.to_string(),
            customer_name: booking.customer.name.clone(),
            customer_phone: booking.customer.phone.clone(),
            cancellation: booking.cancellation.map(|c| CancellationResponse {
                cancelled_at: c.cancelled_at,
                cancelled_by: c.cancelled_by,
                reason: c.reason,
                refund_amount: c.refund_amount,
                refund_percentage: c.refund_percentage,
            }),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Response for a cancellation request
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub refund_amount: Decimal,
    pub refund_percentage: u32,
}

impl From<Refund> for CancelResponse {
    fn from(refund: Refund) -> Self {
        Self {
            refund_amount: refund.amount,
            refund_percentage: refund.percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;
    use turfbook_core::models::Booking;

    #[test]
    fn test_booking_response_serialization() {
        let booking = Booking {
            reference: 7,
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            slot_start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            duration_hours: dec!(1.5),
            total_amount: dec!(3000),
            ..Default::default()
        };

        let response = BookingResponse::from(booking);
        assert_eq!(response.reference, "TB-000007");
        assert_eq!(response.slot_start, "18:00");
        assert_eq!(response.end_time, "19:30");

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("cancellation"));
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateBookingRequest {
            venue_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            slot_start: "18:00".to_string(),
            duration_hours: 12.0,
            customer: CustomerDto {
                name: "Asha".to_string(),
                phone: None,
            },
        };

        assert!(request.validate().is_err());
    }
}

//! Unified error handling for Turfbook
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Business Logic Errors ====================
    #[error("Venue not found: {0}")]
    VenueNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Venue is closed: {0}")]
    VenueClosed(String),

    #[error("Slot {start} on {date} is already booked")]
    SlotConflict { date: NaiveDate, start: NaiveTime },

    #[error("Booking cannot be cancelled: {0}")]
    NotCancellable(String),

    #[error("Booking already cancelled: {0}")]
    AlreadyCancelled(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation(_)
            | AppError::InvalidInput(_)
            | AppError::MissingField(_)
            | AppError::VenueClosed(_)
            | AppError::NotCancellable(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::VenueNotFound(_) | AppError::BookingNotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::SlotConflict { .. }
            | AppError::AlreadyCancelled(_)
            | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::VenueNotFound(_) => "venue_not_found",
            AppError::BookingNotFound(_) => "booking_not_found",
            AppError::VenueClosed(_) => "venue_closed",
            AppError::SlotConflict { .. } => "slot_conflict",
            AppError::NotCancellable(_) => "not_cancellable",
            AppError::AlreadyCancelled(_) => "already_cancelled",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::SlotConflict {
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BookingNotFound("123".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::NotCancellable("too late".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidTransition {
                from: "completed".to_string(),
                to: "cancelled".to_string(),
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::AlreadyCancelled("b1".to_string()).error_code(),
            "already_cancelled"
        );
        assert_eq!(
            AppError::SlotConflict {
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }
            .error_code(),
            "slot_conflict"
        );
    }
}

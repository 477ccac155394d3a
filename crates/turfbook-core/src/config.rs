//! Application configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Allowed CORS origins, comma separated
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Booking-specific configuration
///
/// Platform-wide defaults; venue config overrides the cancellation
/// thresholds where present.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Minimum booking duration in hours
    #[serde(default = "default_min_duration")]
    pub min_duration_hours: f64,

    /// Maximum booking duration in hours
    #[serde(default = "default_max_duration")]
    pub max_duration_hours: f64,

    /// Default advance-booking window in days
    #[serde(default = "default_advance_days")]
    pub advance_booking_days: i64,

    /// Minimum cancellation notice in hours
    #[serde(default = "default_min_notice")]
    pub min_cancel_notice_hours: i64,

    /// Notice required for a full refund, in hours
    #[serde(default = "default_full_refund")]
    pub full_refund_hours: i64,

    /// Notice required for the 80% refund tier, in hours
    #[serde(default = "default_high_refund")]
    pub high_refund_hours: i64,
}

fn default_min_duration() -> f64 {
    0.5
}

fn default_max_duration() -> f64 {
    8.0
}

fn default_advance_days() -> i64 {
    30
}

fn default_min_notice() -> i64 {
    2
}

fn default_full_refund() -> i64 {
    24
}

fn default_high_refund() -> i64 {
    12
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default(
                "server.cors_origins",
                "http://localhost:3000,http://127.0.0.1:3000",
            )?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("booking.min_duration_hours", 0.5)?
            .set_default("booking.max_duration_hours", 8.0)?
            .set_default("booking.advance_booking_days", 30)?
            .set_default("booking.min_cancel_notice_hours", 2)?
            .set_default("booking.full_refund_hours", 24)?
            .set_default("booking.high_refund_hours", 12)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with TURFBOOK_ prefix
            .add_source(
                Environment::with_prefix("TURFBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            min_duration_hours: 0.5,
            max_duration_hours: 8.0,
            advance_booking_days: 30,
            min_cancel_notice_hours: 2,
            full_refund_hours: 24,
            high_refund_hours: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_booking_config() {
        let config = BookingConfig::default();
        assert_eq!(config.min_duration_hours, 0.5);
        assert_eq!(config.max_duration_hours, 8.0);
        assert_eq!(config.full_refund_hours, 24);
    }
}

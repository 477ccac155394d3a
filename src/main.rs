//! Turfbook Server
//!
//! HTTP service exposing the slot-booking engine: venue availability,
//! booking creation with atomic slot claims, and cancellation refunds.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use rust_decimal::Decimal;
use std::env;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use turfbook_api::{configure_bookings, configure_venues, AppCalendar, AppLifecycle};
use turfbook_core::{cancellation::CancellationTerms, AppConfig, SystemClock};
use turfbook_db::{create_pool, PgBookingRepository, PgStatsRepository, PgVenueRepository};
use turfbook_services::{
    stats::event_channel, BookingLifecycle, DurationLimits, StatsAggregator, VenueCalendar,
};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "turfbook",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure API routes
fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            // Venue summaries and slot availability
            .configure(configure_venues)
            // Booking lifecycle endpoints
            .configure(configure_bookings),
    );
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "turfbook={},turfbook_api={},turfbook_services={},turfbook_db={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    init_tracing();

    info!("Starting Turfbook v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    turfbook_db::pool::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Platform-wide cancellation defaults; venue config overrides per venue
    let default_terms = CancellationTerms {
        min_notice_hours: config.booking.min_cancel_notice_hours,
        full_refund_hours: config.booking.full_refund_hours,
        high_refund_hours: config.booking.high_refund_hours,
    };

    let limits = DurationLimits {
        min_hours: Decimal::try_from(config.booking.min_duration_hours)
            .expect("invalid booking.min_duration_hours"),
        max_hours: Decimal::try_from(config.booking.max_duration_hours)
            .expect("invalid booking.max_duration_hours"),
    };

    // Repositories
    let bookings = Arc::new(PgBookingRepository::new(pool.clone()));
    let venues = Arc::new(PgVenueRepository::new(pool.clone(), default_terms));
    let stats = Arc::new(PgStatsRepository::new(pool.clone()));

    // Booking events feed the stats aggregator off the hot path
    let (events_tx, events_rx) = event_channel();
    let _aggregator = StatsAggregator::spawn(stats, events_rx);

    // Services
    let lifecycle: Arc<AppLifecycle> = Arc::new(BookingLifecycle::new(
        bookings.clone(),
        venues.clone(),
        Arc::new(SystemClock),
        limits,
        events_tx,
    ));
    let calendar: Arc<AppCalendar> = Arc::new(VenueCalendar::new(bookings.clone()));

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    let cors_origins = config.server.cors_origins.clone();

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    // Create and run server
    HttpServer::new(move || {
        // Configure CORS - clone cors_origins for each worker
        let cors_origins_inner = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origins: Vec<&str> = cors_origins_inner.split(',').collect();
                if let Ok(origin_str) = origin.to_str() {
                    origins.iter().any(|o| o.trim() == origin_str)
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Repositories and services as app data
            .app_data(web::Data::from(bookings.clone()))
            .app_data(web::Data::from(venues.clone()))
            .app_data(web::Data::from(lifecycle.clone()))
            .app_data(web::Data::from(calendar.clone()))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                let error_message = err.to_string();
                actix_web::error::InternalError::from_response(
                    err,
                    HttpResponse::BadRequest().json(serde_json::json!({
                        "error": "invalid_query",
                        "message": error_message
                    })),
                )
                .into()
            }))
            // Middleware
            .wrap(cors)
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_routes)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}

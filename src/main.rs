pub mod bookings;
pub mod codes;
pub mod config;
pub mod db;
pub mod error;
pub mod fleet;
pub mod notifications;
pub mod payments;

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bookings::{BookingService, BookingsRepository, DeclinedPaymentPolicy};
use codes::RandomCodeGenerator;
use config::MissionCatalog;
use error::ApiError;
use fleet::FleetRepository;
use notifications::LoggingEmailSender;
use payments::MockPaymentProcessor;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        bookings::handlers::create_booking,
        bookings::handlers::list_bookings,
        bookings::handlers::get_booking,
        bookings::handlers::update_booking_status,
        fleet::handlers::list_missions,
        fleet::handlers::get_mission,
        fleet::handlers::create_mission,
        fleet::handlers::list_trips,
        fleet::handlers::list_boats,
        reload_catalog,
    ),
    components(schemas(
        bookings::CreateBookingRequest,
        bookings::BookingItemRequest,
        bookings::UpdateBookingStatusRequest,
        bookings::BookingResponse,
        bookings::BookingItemResponse,
        bookings::BookingCreationResponse,
        bookings::PaymentOutcome,
        bookings::NotificationOutcome,
        bookings::BookingStatus,
        bookings::ItemStatus,
        bookings::ItemType,
        notifications::CheckInPass,
        fleet::Mission,
        fleet::Trip,
        fleet::Boat,
        fleet::TripType,
        fleet::CreateMission,
        fleet::UpdateMission,
    )),
    tags(
        (name = "bookings", description = "Booking allocation endpoints"),
        (name = "missions", description = "Mission record management"),
        (name = "trips", description = "Trip record management"),
        (name = "boats", description = "Boat record management"),
        (name = "config", description = "Mission catalog administration")
    ),
    info(
        title = "Launch Tours API",
        version = "1.0.0",
        description = "Booking allocation API for rocket-launch excursion trips"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub fleet_repo: FleetRepository,
    pub booking_service: BookingService,
    pub catalog: Arc<MissionCatalog>,
}

#[derive(serde::Serialize)]
struct ReloadResponse {
    missions: usize,
}

/// Handler for POST /api/v1/config/reload
/// Re-reads the mission catalog file and swaps it in atomically. On
/// failure the previous catalog stays in force.
#[utoipa::path(
    post,
    path = "/api/v1/config/reload",
    responses(
        (status = 200, description = "Catalog reloaded"),
        (status = 500, description = "Catalog file invalid; previous catalog kept")
    ),
    tag = "config"
)]
async fn reload_catalog(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, ApiError> {
    state.catalog.reload().map_err(|e| {
        tracing::error!("Catalog reload failed, keeping previous snapshot: {}", e);
        ApiError::InternalError(format!("catalog reload failed: {}", e))
    })?;

    let snapshot = state.catalog.snapshot();
    tracing::info!(
        "Catalog reloaded: {} missions for launch '{}'",
        snapshot.missions.len(),
        snapshot.launch.id
    );
    Ok(Json(ReloadResponse {
        missions: snapshot.missions.len(),
    }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Booking allocation
        .route("/api/v1/bookings", post(bookings::handlers::create_booking))
        .route("/api/v1/bookings", get(bookings::handlers::list_bookings))
        .route("/api/v1/bookings/:id", get(bookings::handlers::get_booking))
        .route(
            "/api/v1/bookings/:id/status",
            patch(bookings::handlers::update_booking_status),
        )
        // Fleet records
        .route("/api/v1/missions", get(fleet::handlers::list_missions))
        .route("/api/v1/missions", post(fleet::handlers::create_mission))
        .route("/api/v1/missions/:id", get(fleet::handlers::get_mission))
        .route("/api/v1/missions/:id", put(fleet::handlers::update_mission))
        .route(
            "/api/v1/missions/:id",
            axum::routing::delete(fleet::handlers::delete_mission),
        )
        .route("/api/v1/trips", get(fleet::handlers::list_trips))
        .route("/api/v1/trips/:id", get(fleet::handlers::get_trip))
        .route("/api/v1/boats", get(fleet::handlers::list_boats))
        .route("/api/v1/boats/:id", get(fleet::handlers::get_boat))
        // Catalog administration
        .route("/api/v1/config/reload", post(reload_catalog))
        .layer(cors)
        .with_state(state)
}

fn build_state(db: PgPool, catalog: Arc<MissionCatalog>) -> AppState {
    let declined_policy = std::env::var("DECLINED_PAYMENT_POLICY")
        .ok()
        .and_then(|v| DeclinedPaymentPolicy::parse(&v))
        .unwrap_or_default();

    let booking_service = BookingService::new(
        BookingsRepository::new(db.clone()),
        Arc::clone(&catalog),
        Arc::new(MockPaymentProcessor),
        Arc::new(LoggingEmailSender::new(
            std::env::var("NOTIFICATION_FROM")
                .unwrap_or_else(|_| "bookings@launchtours.example".to_string()),
        )),
        Arc::new(RandomCodeGenerator),
    )
    .with_declined_policy(declined_policy);

    AppState {
        fleet_repo: FleetRepository::new(db.clone()),
        booking_service,
        catalog,
        db,
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Launch Tours API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let catalog_path =
        std::env::var("MISSION_CONFIG_PATH").unwrap_or_else(|_| "data/missions.yml".to_string());

    // An unreadable or invalid catalog is fatal at startup; the process
    // must never serve bookings without prices and capacities.
    tracing::info!("Loading mission catalog from {}", catalog_path);
    let catalog = Arc::new(
        MissionCatalog::load(&catalog_path).expect("Failed to load mission catalog"),
    );
    tracing::info!(
        "Mission catalog loaded: {} missions",
        catalog.snapshot().missions.len()
    );

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(build_state(db_pool, catalog));

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Launch Tours API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;

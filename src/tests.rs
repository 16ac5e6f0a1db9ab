// HTTP-level tests for the booking API surface.
// These run without a database: the pool is lazy, so only requests that
// are rejected before any query (validation failures, catalog
// administration) are exercised here. Allocator behavior against real
// data is covered by the unit tests in the bookings modules.

use super::*;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::io::Write;

const CATALOG_YAML: &str = r#"
launch:
  id: artemis-2
  name: Artemis II
  date_time: 2026-09-20T12:45:00Z
  location_id: cape-canaveral
missions:
  - id: artemis-2-viewing
    name: Artemis II Launch Viewing
    launch_id: artemis-2
    active: true
    public: true
    sales_open_at: 2026-06-01T00:00:00Z
    trips:
      - id: lv-morning
        type: launch_viewing
        check_in_time: 2026-09-20T08:00:00Z
        boarding_time: 2026-09-20T09:00:00Z
        departure_time: 2026-09-20T09:30:00Z
        pricing:
          adult_ticket: "100.00"
          child_ticket: "75.00"
        boats:
          - boat_id: endeavour
            max_capacity: 50
"#;

/// Write the catalog fixture to a unique temp file and return its path.
fn write_catalog_file(contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("missions-{}.yml", uuid::Uuid::new_v4()));
    let mut file = std::fs::File::create(&path).expect("create catalog fixture");
    file.write_all(contents.as_bytes())
        .expect("write catalog fixture");
    path
}

/// Build a test server over a lazy pool. No connection is made unless a
/// handler actually runs a query.
fn create_test_server(catalog_path: &std::path::Path) -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://unused@localhost:1/unused")
        .expect("lazy pool");
    let catalog =
        std::sync::Arc::new(MissionCatalog::load(catalog_path).expect("load catalog fixture"));
    let app = create_router(build_state(pool, catalog));
    TestServer::new(app).expect("test server")
}

fn valid_booking_payload() -> serde_json::Value {
    json!({
        "mission_id": uuid::Uuid::new_v4(),
        "user_name": "Ada Lovelace",
        "user_email": "ada@example.com",
        "user_phone": "+1 555 0100",
        "billing_address": "1 Rocket Road, Cape Canaveral",
        "items": [
            {
                "trip_id": uuid::Uuid::new_v4(),
                "boat_id": uuid::Uuid::new_v4(),
                "item_type": "adult_ticket",
                "quantity": 2
            }
        ]
    })
}

// ============================================================================
// Booking request validation (rejected before any database work)
// ============================================================================

#[tokio::test]
async fn test_create_booking_empty_items_rejected() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let mut payload = valid_booking_payload();
    payload["items"] = json!([]);

    let response = server.post("/api/v1/bookings").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_invalid_email_rejected() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let mut payload = valid_booking_payload();
    payload["user_email"] = json!("not-an-email");

    let response = server.post("/api/v1/bookings").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_zero_quantity_rejected() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let mut payload = valid_booking_payload();
    payload["items"][0]["quantity"] = json!(0);

    let response = server.post("/api/v1/bookings").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_seat_without_boat_rejected() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let mut payload = valid_booking_payload();
    payload["items"][0].as_object_mut().unwrap().remove("boat_id");

    let response = server.post("/api/v1/bookings").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_booking_malformed_id_rejected() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let response = server.get("/api/v1/bookings/not-a-uuid").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Catalog administration
// ============================================================================

#[tokio::test]
async fn test_reload_catalog_success() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let response = server.post("/api/v1/config/reload").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["missions"], json!(1));
}

#[tokio::test]
async fn test_reload_catalog_picks_up_file_changes() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let extra_mission = r#"
  - id: artemis-2-backup
    name: Backup Window Viewing
    launch_id: artemis-2
    active: false
    public: false
    sales_open_at: 2026-06-01T00:00:00Z
    trips:
      - id: lv-backup
        type: launch_viewing
        check_in_time: 2026-09-21T08:00:00Z
        boarding_time: 2026-09-21T09:00:00Z
        departure_time: 2026-09-21T09:30:00Z
        pricing:
          adult_ticket: "100.00"
"#;
    std::fs::write(&path, format!("{}{}", CATALOG_YAML, extra_mission))
        .expect("rewrite catalog fixture");

    let response = server.post("/api/v1/config/reload").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["missions"], json!(2));
}

#[tokio::test]
async fn test_reload_catalog_invalid_file_keeps_previous() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    std::fs::write(&path, "missions: [").expect("corrupt catalog fixture");

    let response = server.post("/api/v1/config/reload").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    // Old catalog stays in force; fixing the file makes reload work again.
    std::fs::write(&path, CATALOG_YAML).expect("restore catalog fixture");
    let response = server.post("/api/v1/config/reload").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

// ============================================================================
// OpenAPI surface
// ============================================================================

#[tokio::test]
async fn test_openapi_document_is_served() {
    let path = write_catalog_file(CATALOG_YAML);
    let server = create_test_server(&path);

    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/api/v1/bookings"].is_object());
    assert!(doc["paths"]["/api/v1/missions"].is_object());
}

//! Integration tests for the Character Roster Server API
//!
//! These tests verify the complete request/response cycle for all endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use character_roster_server::routes::{
    create_character, delete_character, get_character, health_check, list_accounts,
    list_characters, update_character,
};
use character_roster_server::{open_database, seed_account, AppState, Config, Db};

const TEST_ACCOUNT: &str = "admin";
const TEST_SLOTS: u32 = 3;

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a test configuration
fn test_config() -> Config {
    Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,                // Random port
        database_path: "".to_string(), // Will be set per test
        allowed_origins: vec!["http://localhost:5173".to_string()],
        seed_account: TEST_ACCOUNT.to_string(),
        character_slots: TEST_SLOTS,
        environment: "test".to_string(),
    }
}

/// Create a seeded test database in a temporary directory
fn create_test_db(temp_dir: &TempDir) -> Db {
    let db_path = temp_dir.path().join("test.db");
    let db = open_database(&db_path).expect("Failed to create test database");
    seed_account(&db, TEST_ACCOUNT, TEST_SLOTS).expect("Failed to seed account");
    db
}

/// Create a test app router
fn create_test_app(db: Db) -> Router {
    let state = AppState {
        db,
        config: test_config(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/characters", get(list_characters).post(create_character))
        .route(
            "/api/characters/:id",
            get(get_character)
                .put(update_character)
                .delete(delete_character),
        )
        .route("/api/accounts", get(list_accounts))
        .with_state(state)
}

/// Parse response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a POST request with JSON body
fn make_post_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Create a GET request
fn make_get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Create a PUT request with JSON body
fn make_put_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

/// Create a DELETE request
fn make_delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Create a character through the API and return its assigned id
async fn create_via_api(db: Db, name: &str, role: &str, level: i32) -> u64 {
    let app = create_test_app(db);
    let body = json!({ "name": name, "role": role, "level": level });

    let response = app
        .oneshot(make_post_request("/api/characters", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_to_json(response.into_body()).await;
    json["id"].as_u64().unwrap()
}

/// Read the remaining slots for the test account through the API
async fn slots_via_api(db: Db) -> u64 {
    let app = create_test_app(db);
    let response = app
        .oneshot(make_get_request("/api/accounts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let accounts = json["accounts"].as_array().unwrap();
    let account = accounts
        .iter()
        .find(|a| a["name"] == TEST_ACCOUNT)
        .expect("Seeded account should be listed");
    account["slotsRemaining"].as_u64().unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let app = create_test_app(db.clone());
    let response = app.oneshot(make_get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
    assert_eq!(json["rosterSize"].as_u64().unwrap(), 0);

    // The probe counts the live roster
    create_via_api(db.clone(), "Themis", "Elidibus", 99).await;

    let app = create_test_app(db);
    let response = app.oneshot(make_get_request("/health")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["rosterSize"].as_u64().unwrap(), 1);
}

// =============================================================================
// Character CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_list_characters_empty() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(create_test_db(&temp_dir));

    let response = app
        .oneshot(make_get_request("/api/characters"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["characters"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_and_get_character() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let id = create_via_api(db.clone(), "Themis", "Elidibus", 99).await;

    let app = create_test_app(db.clone());
    let response = app
        .oneshot(make_get_request(&format!("/api/characters/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["id"].as_u64().unwrap(), id);
    assert_eq!(json["name"], "Themis");
    assert_eq!(json["role"], "Elidibus");
    assert_eq!(json["level"], 99);

    // Creation consumed one slot
    assert_eq!(slots_via_api(db).await, (TEST_SLOTS - 1) as u64);
}

#[tokio::test]
async fn test_get_unknown_character() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(create_test_db(&temp_dir));

    let response = app
        .oneshot(make_get_request("/api/characters/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Character not found");
}

#[tokio::test]
async fn test_list_characters_by_role() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    create_via_api(db.clone(), "Urianger", "Scion", 90).await;
    create_via_api(db.clone(), "Thancred", "Scion", 90).await;
    create_via_api(db.clone(), "Hades", "Emet-Selch", 99).await;

    let app = create_test_app(db);
    let response = app
        .oneshot(make_get_request("/api/characters?role=Scion"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let characters = json["characters"].as_array().unwrap();
    assert_eq!(characters.len(), 2);
    assert!(characters.iter().all(|c| c["role"] == "Scion"));
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let app = create_test_app(db.clone());
    let body = json!({ "name": "  ", "role": "Scion", "level": 1 });
    let response = app
        .oneshot(make_post_request("/api/characters", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was created, no slot consumed
    assert_eq!(slots_via_api(db).await, TEST_SLOTS as u64);
}

#[tokio::test]
async fn test_create_duplicate_name_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    create_via_api(db.clone(), "Themis", "Elidibus", 99).await;

    let app = create_test_app(db.clone());
    let body = json!({ "name": "Themis", "role": "Azem", "level": 1 });
    let response = app
        .oneshot(make_post_request("/api/characters", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "A character with that name already exists");

    // The refused create did not consume a slot
    assert_eq!(slots_via_api(db).await, (TEST_SLOTS - 1) as u64);
}

#[tokio::test]
async fn test_create_when_roster_full_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    for i in 0..TEST_SLOTS {
        create_via_api(db.clone(), &format!("Member {}", i), "Scion", 1).await;
    }
    assert_eq!(slots_via_api(db.clone()).await, 0);

    let app = create_test_app(db);
    let body = json!({ "name": "One Too Many", "role": "Scion", "level": 1 });
    let response = app
        .oneshot(make_post_request("/api/characters", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "No character slots remaining for this account");
}

#[tokio::test]
async fn test_update_character() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let id = create_via_api(db.clone(), "Themis", "Elidibus", 99).await;

    let app = create_test_app(db.clone());
    let body = json!({ "name": "Themis", "role": "Elidibus", "level": 90 });
    let response = app
        .oneshot(make_put_request(
            &format!("/api/characters/{}", id),
            body.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["level"], 90);

    // Updates never touch the quota
    assert_eq!(slots_via_api(db).await, (TEST_SLOTS - 1) as u64);
}

#[tokio::test]
async fn test_update_unknown_character() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(create_test_db(&temp_dir));

    let body = json!({ "name": "Nobody", "role": "Nothing", "level": 1 });
    let response = app
        .oneshot(make_put_request("/api/characters/777", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_character_restores_slot() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let id = create_via_api(db.clone(), "Themis", "Elidibus", 99).await;
    assert_eq!(slots_via_api(db.clone()).await, (TEST_SLOTS - 1) as u64);

    let app = create_test_app(db.clone());
    let response = app
        .oneshot(make_delete_request(&format!("/api/characters/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["deleted"], true);
    assert_eq!(slots_via_api(db.clone()).await, TEST_SLOTS as u64);

    // Deleting the same id again is a no-op, not an error
    let app = create_test_app(db.clone());
    let response = app
        .oneshot(make_delete_request(&format!("/api/characters/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["deleted"], false);
    assert_eq!(slots_via_api(db).await, TEST_SLOTS as u64);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_list_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let db = create_test_db(&temp_dir);

    let app = create_test_app(db);
    let response = app
        .oneshot(make_get_request("/api/accounts"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    let accounts = json["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["name"], TEST_ACCOUNT);
    assert_eq!(accounts[0]["slotsRemaining"].as_u64().unwrap(), TEST_SLOTS as u64);
}

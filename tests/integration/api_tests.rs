//! API integration tests
//!
//! Need a running server with a seeded database: at least one active
//! barber, client and service.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// First active (barber, client, service) ids from the reference lists
async fn reference_ids(client: &Client) -> (i64, i64, i64) {
    let body: Value = client
        .get(format!("{}/reference", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse reference response");

    let first = |list: &str| body[list][0]["id"].as_i64().unwrap_or_else(|| panic!("no active {}", list));
    (first("barbers"), first("clients"), first("services"))
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_week_grid_has_seven_days() {
    let client = Client::new();

    let response = client
        .get(format!("{}/agenda/week?offset=1&status=all", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["window"]["offset_weeks"], 1);
    assert_eq!(body["window"]["days"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["window"]["days"][0]["weekday"], "Lunes");
}

#[tokio::test]
#[ignore]
async fn test_unknown_status_filter_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/agenda/week?status=Cerrada", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_create_without_offering_rejected() {
    let client = Client::new();
    let (barber_id, client_id, _) = reference_ids(&client).await;

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .json(&json!({
            "client_id": client_id,
            "barber_id": barber_id,
            "date": "2030-01-07",
            "time": "09:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "A service or a package is required");
}

#[tokio::test]
#[ignore]
async fn test_appointment_lifecycle() {
    let client = Client::new();
    let (barber_id, client_id, service_id) = reference_ids(&client).await;

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .json(&json!({
            "client_id": client_id,
            "barber_id": barber_id,
            "service_id": service_id,
            "date": "2030-01-07",
            "time": "09:00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let created: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(created["status"], "Pendiente");
    let id = created["id"].as_i64().expect("No id in response");

    let response = client
        .put(format!("{}/appointments/{}/status", BASE_URL, id))
        .json(&json!({ "status": "Completada" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["status"], "Completada");

    // Unconfirmed deletion is refused
    let response = client
        .delete(format!("{}/appointments/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .delete(format!("{}/appointments/{}?confirm=true", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/appointments/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_save_and_clear_week() {
    let client = Client::new();
    let (barber_id, _, _) = reference_ids(&client).await;

    let response = client
        .put(format!("{}/schedules/barbers/{}", BASE_URL, barber_id))
        .json(&json!({
            "blocks": [
                { "weekday": "Lunes", "start_time": "09:00", "end_time": "13:00" },
                { "weekday": "Miércoles", "start_time": "14:00", "end_time": "18:00" }
            ]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let report: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(report["failures"].as_array().map(Vec::len), Some(0));
    assert_eq!(report["blocks"].as_array().map(Vec::len), Some(2));

    let response = client
        .put(format!("{}/schedules/barbers/{}", BASE_URL, barber_id))
        .json(&json!({
            "blocks": [{ "weekday": "Lunes", "start_time": "13:00", "end_time": "09:00" }]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .delete(format!("{}/schedules/barbers/{}", BASE_URL, barber_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let report: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(report["blocks"].as_array().map(Vec::len), Some(0));
}

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;

fn create_test_app() -> Router {
    appointment_routes(Arc::new(BookingService::in_memory()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn generate(app: &Router, start: &str, end: &str) -> (StatusCode, Value) {
    send(app, Method::POST, "/doctor", Some(json!({"start_time": start, "end_time": end}))).await
}

async fn assign(app: &Router, name: &str, phone: &str, id: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/patient",
        Some(json!({"patient_name": name, "patient_phone_number": phone, "appointment_id": id})),
    )
    .await
}

#[tokio::test]
async fn test_end_before_start_is_a_bad_request() {
    let app = create_test_app();

    let (status, _) = generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:49:00").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = generate(&app, "2022-06-05T17:30:00", "2022-06-05T16:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end time must occur after start time");
}

#[tokio::test]
async fn test_oversized_window_is_a_bad_request() {
    let app = create_test_app();

    let (status, body) = generate(&app, "2022-01-01T00:00:00", "2023-01-01T00:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "a single request may generate at most 10000 slots");
}

#[tokio::test]
async fn test_generation_lists_created_slots() {
    let app = create_test_app();

    let (_, body) = generate(&app, "2022-06-05T17:30:00", "2022-06-05T17:40:00").await;
    assert_eq!(body, json!([]));

    let (status, body) = generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([
        {"id": 1, "starting_time": "2022-06-05T17:30:00", "patient": null},
        {"id": 2, "starting_time": "2022-06-05T18:00:00", "patient": null}
    ]));
}

#[tokio::test]
async fn test_generation_requires_both_bounds() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::POST, "/doctor", Some(json!({"start_time": "2022-06-05T17:30:00"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_time: This field is required.");
}

#[tokio::test]
async fn test_duplicate_generation_conflicts() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;

    let (status, body) = generate(&app, "2022-06-05T18:00:00", "2022-06-05T19:00:00").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "a slot already exists at 2022-06-05T18:00:00");
}

#[tokio::test]
async fn test_listing_starts_empty_then_shows_generated_slots() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/doctor", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    let (_, body) = send(&app, Method::GET, "/doctor", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_listing_shows_patient_of_taken_slots() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    assign(&app, "Kevin", "123", 1).await;

    let (_, body) = send(&app, Method::GET, "/doctor", None).await;
    let slots = body.as_array().unwrap();
    assert!(slots.iter().any(|s| s["patient"] == json!({"name": "Kevin", "phone_number": "123"})));
    assert!(slots.iter().any(|s| s["patient"].is_null()));
}

#[tokio::test]
async fn test_delete_unknown_appointment_is_404() {
    let app = create_test_app();

    let (status, _) = send(&app, Method::DELETE, "/doctor/898", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/doctor/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_taken_appointment_is_406() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    assign(&app, "Kevin", "123", 1).await;

    let (status, body) = send(&app, Method::DELETE, "/doctor/1", None).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["error"], "this time slot is taken by a patient");
}

#[tokio::test]
async fn test_delete_available_appointment_is_204() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;

    let (status, body) = send(&app, Method::DELETE, "/doctor/2", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send(&app, Method::DELETE, "/doctor/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_available_list_for_a_day() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/available/2022-5-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    assign(&app, "Kevin", "123", 1).await;

    let (_, body) = send(&app, Method::GET, "/available/2022-06-05", None).await;
    assert_eq!(body, json!([{"id": 2, "starting_time": "2022-06-05T18:00:00", "patient": null}]));
}

#[tokio::test]
async fn test_claim_requires_name_and_phone_number() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;

    let (status, _) = send(&app, Method::POST, "/patient",
        Some(json!({"patient_phone_number": "266", "appointment_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/patient",
        Some(json!({"patient_name": "Alex", "appointment_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_claim_body_is_400() {
    let app = create_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/patient")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::POST, "/patient",
        Some(json!({"patient_name": 7, "patient_phone_number": "266", "appointment_id": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_claiming_taken_appointment_is_409() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;

    let (status, body) = assign(&app, "Kevin", "123", 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["name"], "Kevin");

    let (status, body) = assign(&app, "Alex", "255", 1).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "this time slot is already taken by a patient");
}

#[tokio::test]
async fn test_claiming_missing_appointment_is_404() {
    let app = create_test_app();

    let (status, body) = assign(&app, "Kevin", "123", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "appointment doesn't exist");
}

#[tokio::test]
async fn test_patient_listing_is_empty_for_unknown_number() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::GET, "/patient/09365489687", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_patient_listing_returns_all_claims() {
    let app = create_test_app();
    generate(&app, "2022-06-05T17:30:00", "2022-06-05T18:40:00").await;
    assign(&app, "Kevin", "123", 1).await;
    assign(&app, "Kevin", "123", 2).await;

    let (_, body) = send(&app, Method::GET, "/patient/123", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_routes_accept_a_trailing_slash() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/doctor/",
        Some(json!({"start_time": "2022-06-05T17:30:00", "end_time": "2022-06-05T18:40:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(&app, Method::GET, "/doctor/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/patient/",
        Some(json!({"patient_name": "Kevin", "patient_phone_number": "123", "appointment_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["name"], "Kevin");

    let (_, body) = send(&app, Method::GET, "/patient/123/", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/available/2022-06-05/", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/doctor/2/", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

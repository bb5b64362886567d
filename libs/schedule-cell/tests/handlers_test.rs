use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

const DOCTOR_ID: &str = "7c0e8b8a-5c43-4a4e-9a39-62d7f71e0001";

fn create_test_app(config: AppConfig) -> Router {
    schedule_routes(Arc::new(config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn available_slots_endpoint_returns_filtered_grid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::weekly_schedule_row(
                DOCTOR_ID, 1, Some("09:00:00"), Some("17:00:00"), None, None, true
            )
        ])))
        .mount(&mock_server)
        .await;

    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(test_config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/available-slots?date=2024-06-03", DOCTOR_ID))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total_slots"], 16);
    assert_eq!(body["available_slots"][0]["value"], "09:00");
    assert_eq!(body["available_slots"][0]["label"], "9:00 AM");
}

#[tokio::test]
async fn leave_check_endpoint_reports_leave() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::leave_row(DOCTOR_ID, "2024-06-03", "half_day_evening")
        ])))
        .mount(&mock_server)
        .await;

    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let app = create_test_app(test_config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/leave?date=2024-06-03", DOCTOR_ID))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["on_leave"], true);
    assert_eq!(body["leave_type"], "half_day_evening");
}

#[tokio::test]
async fn schedule_management_requires_auth() {
    let test_config = TestConfig::default();
    let app = create_test_app(test_config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/schedule/1", DOCTOR_ID))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "is_available": true }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn schedule_upsert_rejects_inverted_window() {
    let test_config = TestConfig::default();
    let user = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&user, &test_config.jwt_secret, Some(1));
    let app = create_test_app(test_config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}/schedule/1", DOCTOR_ID))
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(
                    json!({
                        "is_available": true,
                        "start_time": "17:00",
                        "end_time": "09:00"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_leave_is_rejected_with_conflict() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::leave_row(DOCTOR_ID, "2024-06-03", "full_day")
        ])))
        .mount(&mock_server)
        .await;

    let test_config = TestConfig::with_supabase_url(&mock_server.uri());
    let user = TestUser::doctor("doc@example.com");
    let token = JwtTestUtils::create_test_token(&user, &test_config.jwt_secret, Some(1));
    let app = create_test_app(test_config.to_app_config());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/leaves", DOCTOR_ID))
                .header("content-type", "application/json")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::from(
                    json!({
                        "leave_date": "2024-06-03",
                        "leave_type": "full_day"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

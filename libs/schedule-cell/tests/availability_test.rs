use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use schedule_cell::services::availability::AvailabilityService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

const DOCTOR_ID: &str = "7c0e8b8a-5c43-4a4e-9a39-62d7f71e0001";

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// 2024-06-03 is a Monday (weekday index 1)
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

async fn service_for(mock_server: &MockServer) -> AvailabilityService {
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    AvailabilityService::new(&config)
}

async fn mock_no_leave(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .and(query_param("doctor_id", format!("eq.{}", DOCTOR_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn unconfigured_doctor_gets_full_grid() {
    let mock_server = MockServer::start().await;
    mock_no_leave(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert_eq!(slots.len(), 48);
    assert_eq!(slots[0].value, t(0, 0));
    assert_eq!(slots[0].label, "12:00 AM");
}

#[tokio::test]
async fn full_day_leave_short_circuits_to_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::leave_row(DOCTOR_ID, "2024-06-03", "full_day")
        ])))
        .mount(&mock_server)
        .await;

    // No schedule mock: a full-day leave must not even consult the schedule

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert!(slots.is_empty());
}

#[tokio::test]
async fn unavailable_weekday_yields_empty() {
    let mock_server = MockServer::start().await;
    mock_no_leave(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .and(query_param("day_of_week", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::weekly_schedule_row(
                DOCTOR_ID, 1, Some("09:00:00"), Some("17:00:00"), None, None, false
            )
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert!(slots.is_empty());
}

#[tokio::test]
async fn working_hours_and_break_filter_the_grid() {
    let mock_server = MockServer::start().await;
    mock_no_leave(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::weekly_schedule_row(
                DOCTOR_ID,
                1,
                Some("09:00:00"),
                Some("17:00:00"),
                Some("13:00:00"),
                Some("14:00:00"),
                true
            )
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    // [09:00,13:00) u [14:00,17:00) at 30-minute granularity
    assert_eq!(slots.len(), 14);
    assert_eq!(slots[0].value, t(9, 0));
    assert!(slots.iter().all(|s| s.value < t(13, 0) || s.value >= t(14, 0)));
    assert_eq!(slots.last().unwrap().value, t(16, 30));
}

#[tokio::test]
async fn morning_leave_keeps_only_afternoon() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::leave_row(DOCTOR_ID, "2024-06-03", "half_day_morning")
        ])))
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

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0].value, t(12, 0));
    assert_eq!(slots.last().unwrap().value, t(16, 30));
}

#[tokio::test]
async fn schedule_read_failure_fails_open_with_full_grid() {
    let mock_server = MockServer::start().await;
    mock_no_leave(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection reset", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert_eq!(slots.len(), 48);
}

#[tokio::test]
async fn leave_read_failure_fails_open_with_full_grid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_leaves"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection reset", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let slots = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert_eq!(slots.len(), 48);
}

#[tokio::test]
async fn resolver_is_idempotent_for_unchanged_data() {
    let mock_server = MockServer::start().await;
    mock_no_leave(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_weekly_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::weekly_schedule_row(
                DOCTOR_ID, 1, Some("09:00:00"), Some("17:00:00"), None, None, true
            )
        ])))
        .mount(&mock_server)
        .await;

    let service = service_for(&mock_server).await;
    let first = service.get_available_slots(DOCTOR_ID, monday(), None).await;
    let second = service.get_available_slots(DOCTOR_ID, monday(), None).await;

    assert_eq!(first, second);
}

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::services::guard::BookingGuard;
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

const DOCTOR_ID: &str = "7c0e8b8a-5c43-4a4e-9a39-62d7f71e0001";
const PATIENT_ID: &str = "b3f2d7aa-1f00-4d55-8f3e-1a2b3c4d0002";

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn d() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn guard_for(mock_server: &MockServer) -> BookingGuard {
    let config = TestConfig::with_supabase_url(&mock_server.uri()).to_app_config();
    BookingGuard::new(Arc::new(SupabaseClient::new(&config)))
}

#[tokio::test]
async fn free_slot_reports_available() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", DOCTOR_ID)))
        .and(query_param("appointment_date", "eq.2024-06-03"))
        .and(query_param("appointment_time", "eq.10:00"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = guard_for(&mock_server)
        .is_slot_available(DOCTOR_ID, d(), t(10, 0), None, None)
        .await;

    assert!(result.available);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn occupied_slot_reports_taken() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                DOCTOR_ID, PATIENT_ID, "2024-06-03", "10:00", "confirmed"
            )
        ])))
        .mount(&mock_server)
        .await;

    let result = guard_for(&mock_server)
        .is_slot_available(DOCTOR_ID, d(), t(10, 0), None, None)
        .await;

    assert!(!result.available);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn cancelled_rows_are_excluded_from_the_occupancy_query() {
    let mock_server = MockServer::start().await;

    // The mock only matches when the query carries status=neq.cancelled, so
    // a cancelled appointment at this slot never reaches the guard.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "neq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = guard_for(&mock_server)
        .is_slot_available(DOCTOR_ID, d(), t(10, 0), None, None)
        .await;

    assert!(result.available);
}

#[tokio::test]
async fn editing_excludes_the_appointments_own_row() {
    let mock_server = MockServer::start().await;
    let editing_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("neq.{}", editing_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = guard_for(&mock_server)
        .is_slot_available(DOCTOR_ID, d(), t(10, 0), Some(editing_id), None)
        .await;

    // X occupies (doc, date, time), but re-checking with exclude=X must
    // still report the slot as available for X's own edit.
    assert!(result.available);
}

#[tokio::test]
async fn ledger_read_failure_fails_closed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection reset", "XX000"),
        ))
        .mount(&mock_server)
        .await;

    let result = guard_for(&mock_server)
        .is_slot_available(DOCTOR_ID, d(), t(10, 0), None, None)
        .await;

    assert!(!result.available);
    assert!(result.error.is_some());
}

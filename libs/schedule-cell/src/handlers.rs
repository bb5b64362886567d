use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateLeaveRequest, ScheduleError, UpsertScheduleRequest};
use crate::services::{
    availability::AvailabilityService, leave::LeaveService, schedule::ScheduleService,
};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::InvalidDayOfWeek(_) | ScheduleError::InvalidTimeRange(_) => {
                AppError::ValidationError(e.to_string())
            }
            ScheduleError::DuplicateLeave(_) => AppError::Conflict(e.to_string()),
            ScheduleError::LeaveNotFound(_) => AppError::NotFound(e.to_string()),
            ScheduleError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

/// Candidate bookable slots for a doctor on a date. May legitimately be
/// empty (day off, full-day leave, fully filtered).
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .get_available_slots(&doctor_id, query.date, None)
        .await;
    let total_slots = slots.len();

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "available_slots": slots,
        "total_slots": total_slots
    })))
}

#[axum::debug_handler]
pub async fn check_leave(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let leave_service = LeaveService::new(&state);

    let status = leave_service.check_leave(&doctor_id, query.date, None).await?;

    Ok(Json(json!(status)))
}

// ==============================================================================
// PROTECTED SCHEDULE MANAGEMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_weekly_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);

    let schedules = schedule_service
        .get_weekly_schedule(&doctor_id, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "schedule": schedules
    })))
}

#[axum::debug_handler]
pub async fn upsert_schedule(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((doctor_id, day_of_week)): Path<(String, i32)>,
    Json(request): Json<UpsertScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let schedule_service = ScheduleService::new(&state);

    let schedule = schedule_service
        .upsert_schedule(&doctor_id, day_of_week, request, Some(auth.token()))
        .await?;

    Ok(Json(json!(schedule)))
}

#[axum::debug_handler]
pub async fn create_leave(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<CreateLeaveRequest>,
) -> Result<Json<Value>, AppError> {
    let leave_service = LeaveService::new(&state);

    let leave = leave_service
        .create_leave(&doctor_id, request, Some(auth.token()))
        .await?;

    Ok(Json(json!(leave)))
}

#[axum::debug_handler]
pub async fn cancel_leave(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path((doctor_id, date)): Path<(String, NaiveDate)>,
) -> Result<Json<Value>, AppError> {
    let leave_service = LeaveService::new(&state);

    leave_service
        .cancel_leave(&doctor_id, date, Some(auth.token()))
        .await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": date,
        "cancelled": true
    })))
}

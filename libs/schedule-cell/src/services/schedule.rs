// libs/schedule-cell/src/services/schedule.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{hhmm, ScheduleError, UpsertScheduleRequest, WeeklySchedule};

pub struct ScheduleService {
    supabase: SupabaseClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Full weekly template for a doctor, ordered by weekday.
    pub async fn get_weekly_schedule(
        &self,
        doctor_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        debug!("Fetching weekly schedule for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctor_weekly_schedules?doctor_id=eq.{}&order=day_of_week.asc",
            doctor_id
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let schedules = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<WeeklySchedule>, _>>()
            .map_err(|e| ScheduleError::Database(format!("Failed to parse schedule rows: {}", e)))?;

        Ok(schedules)
    }

    /// Create or overwrite the template for one weekday. Rows are only ever
    /// overwritten, never deleted.
    pub async fn upsert_schedule(
        &self,
        doctor_id: &str,
        day_of_week: i32,
        request: UpsertScheduleRequest,
        auth_token: Option<&str>,
    ) -> Result<WeeklySchedule, ScheduleError> {
        debug!(
            "Upserting schedule for doctor {} weekday {}",
            doctor_id, day_of_week
        );

        validate_schedule(day_of_week, &request)?;

        let existing_path = format!(
            "/rest/v1/doctor_weekly_schedules?doctor_id=eq.{}&day_of_week=eq.{}&limit=1",
            doctor_id, day_of_week
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &existing_path, auth_token, None)
            .await?;

        let body = json!({
            "doctor_id": doctor_id,
            "day_of_week": day_of_week,
            "is_available": request.is_available,
            "start_time": request.start_time.map(|t| t.format(hhmm::FORMAT).to_string()),
            "end_time": request.end_time.map(|t| t.format(hhmm::FORMAT).to_string()),
            "break_start": request.break_start.map(|t| t.format(hhmm::FORMAT).to_string()),
            "break_end": request.break_end.map(|t| t.format(hhmm::FORMAT).to_string()),
            "updated_at": chrono::Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = if existing.is_empty() {
            self.supabase
                .request_with_headers(
                    Method::POST,
                    "/rest/v1/doctor_weekly_schedules",
                    auth_token,
                    Some(body),
                    Some(headers),
                )
                .await?
        } else {
            let path = format!(
                "/rest/v1/doctor_weekly_schedules?doctor_id=eq.{}&day_of_week=eq.{}",
                doctor_id, day_of_week
            );
            self.supabase
                .request_with_headers(Method::PATCH, &path, auth_token, Some(body), Some(headers))
                .await?
        };

        let row = result.into_iter().next().ok_or_else(|| {
            ScheduleError::Database("Upsert returned no schedule row".to_string())
        })?;

        let schedule: WeeklySchedule = serde_json::from_value(row)
            .map_err(|e| ScheduleError::Database(format!("Failed to parse schedule row: {}", e)))?;

        debug!("Schedule row {} written", schedule.id);
        Ok(schedule)
    }
}

fn validate_schedule(day_of_week: i32, request: &UpsertScheduleRequest) -> Result<(), ScheduleError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(ScheduleError::InvalidDayOfWeek(day_of_week));
    }

    if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
        if start >= end {
            return Err(ScheduleError::InvalidTimeRange(
                "Start time must be before end time".to_string(),
            ));
        }
    }

    if let (Some(break_start), Some(break_end)) = (request.break_start, request.break_end) {
        if break_start >= break_end {
            return Err(ScheduleError::InvalidTimeRange(
                "Break start must be before break end".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (request.start_time, request.end_time) {
            if break_start < start || break_end > end {
                return Err(ScheduleError::InvalidTimeRange(
                    "Break must fall within the working window".to_string(),
                ));
            }
        }
    }

    Ok(())
}

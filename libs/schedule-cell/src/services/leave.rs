// libs/schedule-cell/src/services/leave.rs
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateLeaveRequest, LeaveRecord, LeaveStatus, ScheduleError};

pub struct LeaveService {
    supabase: SupabaseClient,
}

impl LeaveService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Whether the doctor is on leave for the given date, and of what kind.
    pub async fn check_leave(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<LeaveStatus, ScheduleError> {
        debug!("Checking leave for doctor {} on {}", doctor_id, date);

        match self.get_leave(doctor_id, date, auth_token).await? {
            Some(leave) => Ok(LeaveStatus {
                on_leave: true,
                leave_type: Some(leave.leave_type),
                reason: leave.reason,
            }),
            None => Ok(LeaveStatus::none()),
        }
    }

    /// Log a leave for a date. At most one leave record may exist per
    /// (doctor, date); a second request for the same date is rejected.
    pub async fn create_leave(
        &self,
        doctor_id: &str,
        request: CreateLeaveRequest,
        auth_token: Option<&str>,
    ) -> Result<LeaveRecord, ScheduleError> {
        debug!(
            "Logging {} leave for doctor {} on {}",
            request.leave_type, doctor_id, request.leave_date
        );

        if self
            .get_leave(doctor_id, request.leave_date, auth_token)
            .await?
            .is_some()
        {
            return Err(ScheduleError::DuplicateLeave(request.leave_date));
        }

        let body = json!({
            "doctor_id": doctor_id,
            "leave_date": request.leave_date,
            "leave_type": request.leave_type,
            "reason": request.reason,
            "created_at": chrono::Utc::now().to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctor_leaves",
                auth_token,
                Some(body),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Database("Insert returned no leave row".to_string()))?;

        let leave: LeaveRecord = serde_json::from_value(row)
            .map_err(|e| ScheduleError::Database(format!("Failed to parse leave row: {}", e)))?;

        debug!("Leave {} recorded", leave.id);
        Ok(leave)
    }

    /// Cancel a logged leave. A changed leave type is modeled as cancel plus
    /// re-log, never an in-place mutation.
    pub async fn cancel_leave(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<(), ScheduleError> {
        debug!("Cancelling leave for doctor {} on {}", doctor_id, date);

        if self.get_leave(doctor_id, date, auth_token).await?.is_none() {
            return Err(ScheduleError::LeaveNotFound(date));
        }

        let path = format!(
            "/rest/v1/doctor_leaves?doctor_id=eq.{}&leave_date=eq.{}",
            doctor_id, date
        );
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        // Without return=representation PostgREST answers 204 with an empty
        // body, which is not valid JSON
        let _: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, auth_token, None, Some(headers))
            .await?;

        Ok(())
    }

    async fn get_leave(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Option<LeaveRecord>, ScheduleError> {
        let path = format!(
            "/rest/v1/doctor_leaves?doctor_id=eq.{}&leave_date=eq.{}&limit=1",
            doctor_id, date
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(row) => {
                let leave: LeaveRecord = serde_json::from_value(row).map_err(|e| {
                    ScheduleError::Database(format!("Failed to parse leave row: {}", e))
                })?;
                Ok(Some(leave))
            }
            None => Ok(None),
        }
    }
}

// libs/appointment-cell/src/services/booking.rs
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use schedule_cell::models::hhmm;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    CancelAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::services::guard::BookingGuard;
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    guard: BookingGuard,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let guard = BookingGuard::new(Arc::clone(&supabase));

        Self {
            supabase,
            guard,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub fn guard(&self) -> &BookingGuard {
        &self.guard
    }

    /// Book a new appointment.
    ///
    /// The occupancy pre-check gives fast feedback; the partial unique index
    /// at the storage layer is what actually prevents a double-booking, and
    /// its rejection surfaces as [`AppointmentError::SlotTaken`] so callers
    /// can re-query and offer alternatives.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with doctor {} at {} {}",
            request.patient_id, request.doctor_id, request.appointment_date, request.appointment_time
        );

        let check = self
            .guard
            .is_slot_available(
                &request.doctor_id.to_string(),
                request.appointment_date,
                request.appointment_time,
                None,
                auth_token,
            )
            .await;

        if !check.available {
            return Err(match check.error {
                Some(e) => AppointmentError::SlotCheckFailed(e),
                None => AppointmentError::SlotTaken,
            });
        }

        let entry_status = if request.walk_in {
            AppointmentStatus::InProgress
        } else {
            AppointmentStatus::Scheduled
        };

        let body = json!({
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time.format(hhmm::FORMAT).to_string(),
            "status": entry_status,
            "appointment_type": request.appointment_type,
            "fees": request.fees,
            "created_at": chrono::Utc::now().to_rfc3339(),
            "updated_at": chrono::Utc::now().to_rfc3339()
        });

        let appointment = self.insert_appointment(body, auth_token).await?;

        info!(
            "Appointment {} booked at {} {} ({})",
            appointment.id, appointment.appointment_date, appointment.appointment_time, entry_status
        );
        Ok(appointment)
    }

    /// Move an existing appointment to a new date/time. The edited
    /// appointment's own row is excluded from the occupancy check so moving
    /// within the same slot is a no-op rather than a conflict.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let current = self.get_appointment(appointment_id, auth_token).await?;

        if current.status.is_terminal() {
            return Err(AppointmentError::Validation(format!(
                "Cannot reschedule a {} appointment",
                current.status
            )));
        }

        let check = self
            .guard
            .is_slot_available(
                &current.doctor_id.to_string(),
                request.new_date,
                request.new_time,
                Some(appointment_id),
                auth_token,
            )
            .await;

        if !check.available {
            return Err(match check.error {
                Some(e) => AppointmentError::SlotCheckFailed(e),
                None => AppointmentError::SlotTaken,
            });
        }

        let body = json!({
            "appointment_date": request.new_date,
            "appointment_time": request.new_time.format(hhmm::FORMAT).to_string(),
            "updated_at": chrono::Utc::now().to_rfc3339()
        });

        self.patch_appointment(appointment_id, body, auth_token).await
    }

    /// Apply a status change, validated by the central state machine.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Updating appointment {} status to {}",
            appointment_id, new_status
        );

        let current = self.get_appointment(appointment_id, auth_token).await?;
        self.lifecycle
            .validate_status_transition(&current.status, &new_status)?;

        let body = json!({
            "status": new_status,
            "updated_at": chrono::Utc::now().to_rfc3339()
        });

        self.patch_appointment(appointment_id, body, auth_token).await
    }

    /// Cancellation is a status change; the row stays in the ledger and
    /// stops occupying its slot.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        if let Some(reason) = &request.reason {
            info!("Cancelling appointment {}: {}", appointment_id, reason);
        } else {
            info!("Cancelling appointment {}", appointment_id);
        }

        self.update_status(appointment_id, AppointmentStatus::Cancelled, auth_token)
            .await
    }

    /// Administrative hard delete. Normal flow never removes rows; this
    /// exists for explicit cleanup only.
    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), AppointmentError> {
        warn!("Administratively deleting appointment {}", appointment_id);

        // 404 on a missing row should surface as NotFound
        self.get_appointment(appointment_id, auth_token).await?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
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

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}&limit=1", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        parse_appointment(row)
    }

    /// Per-date ledger list for one doctor, in slot order.
    pub async fn get_doctor_appointments(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&order=appointment_time.asc",
            doctor_id, date
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        result.into_iter().map(parse_appointment).collect()
    }

    async fn insert_appointment(
        &self,
        body: Value,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                auth_token,
                Some(body),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Insert returned no row".to_string()))?;
        parse_appointment(row)
    }

    async fn patch_appointment(
        &self,
        appointment_id: Uuid,
        body: Value,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, auth_token, Some(body), Some(headers))
            .await?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        parse_appointment(row)
    }
}

fn parse_appointment(row: Value) -> Result<Appointment, AppointmentError> {
    serde_json::from_value(row)
        .map_err(|e| AppointmentError::Database(format!("Failed to parse appointment: {}", e)))
}

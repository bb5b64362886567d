// libs/appointment-cell/src/services/calendar.rs
use chrono::NaiveDate;
use tracing::debug;

use schedule_cell::services::availability::AvailabilityService;
use shared_config::AppConfig;

use crate::models::{AppointmentError, DayView};
use crate::services::booking::AppointmentBookingService;

/// Read-only consumer of the core: assembles what a calendar screen renders
/// for one doctor-day. Not part of the consistency contract; the booking
/// guard re-validates occupancy at write time regardless of what was shown.
pub struct CalendarService {
    availability_service: AvailabilityService,
    booking_service: AppointmentBookingService,
}

impl CalendarService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            availability_service: AvailabilityService::new(config),
            booking_service: AppointmentBookingService::new(config),
        }
    }

    /// Candidate slots plus booked appointments for one date. The slot list
    /// is recomputed on every call; calendars must not cache it across
    /// requests because leave, schedule, and ledger state may change.
    pub async fn day_view(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<DayView, AppointmentError> {
        debug!("Building day view for doctor {} on {}", doctor_id, date);

        let available_slots = self
            .availability_service
            .get_available_slots(doctor_id, date, auth_token)
            .await;

        let appointments = self
            .booking_service
            .get_doctor_appointments(doctor_id, date, auth_token)
            .await?;

        Ok(DayView {
            doctor_id: doctor_id.to_string(),
            date,
            available_slots,
            appointments,
        })
    }
}

// libs/appointment-cell/src/services/guard.rs
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use schedule_cell::models::hhmm;
use schedule_cell::services::availability::ReadFailurePolicy;
use shared_database::supabase::SupabaseClient;

use crate::models::SlotAvailability;

/// The occupancy check fails CLOSED: if the ledger cannot be read, the slot
/// is reported unavailable with an error message. This is deliberately the
/// opposite of the availability resolver's fail-open policy; wrongly blocking
/// one booking attempt is cheaper than a silent double-booking.
pub const OCCUPANCY_READ_FAILURE: ReadFailurePolicy = ReadFailurePolicy::FailClosed;

/// Advisory occupancy pre-check against the appointment ledger.
///
/// This guard gives the UI fast "slot is taken" feedback but is NOT the
/// correctness boundary: two concurrent requests can both pass the check
/// before either insert commits. At-most-one-active-appointment-per-slot is
/// enforced by the partial unique index in db/schema.sql; the write path
/// maps that storage rejection to its own distinct condition.
pub struct BookingGuard {
    supabase: Arc<SupabaseClient>,
}

impl BookingGuard {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// True iff no non-cancelled appointment occupies (doctor, date, time).
    /// When editing an existing appointment, pass its id so its own row does
    /// not count against the slot.
    pub async fn is_slot_available(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<Uuid>,
        auth_token: Option<&str>,
    ) -> SlotAvailability {
        debug!(
            "Checking occupancy for doctor {} at {} {}",
            doctor_id, date, time
        );

        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            format!("appointment_date=eq.{}", date),
            format!("appointment_time=eq.{}", time.format(hhmm::FORMAT)),
            // Cancelled appointments never occupy a slot
            "status=neq.cancelled".to_string(),
        ];

        if let Some(exclude_id) = exclude_appointment_id {
            query_parts.push(format!("id=neq.{}", exclude_id));
        }

        let path = format!(
            "/rest/v1/appointments?{}&limit=1",
            query_parts.join("&")
        );

        let result: Result<Vec<Value>, _> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await;

        match result {
            Ok(rows) if rows.is_empty() => SlotAvailability::open(),
            Ok(_) => {
                debug!(
                    "Slot occupied for doctor {} at {} {}",
                    doctor_id, date, time
                );
                SlotAvailability::taken()
            }
            Err(e) => {
                debug_assert_eq!(OCCUPANCY_READ_FAILURE, ReadFailurePolicy::FailClosed);
                warn!(
                    "Occupancy check failed for doctor {} at {} {} ({}); failing closed",
                    doctor_id, date, time, e
                );
                SlotAvailability::unknown(format!("Unable to verify slot availability: {}", e))
            }
        }
    }
}

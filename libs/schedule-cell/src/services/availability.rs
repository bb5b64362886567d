// libs/schedule-cell/src/services/availability.rs
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};

use crate::models::{LeaveRecord, LeaveType, TimeSlot, WeeklySchedule};
use crate::services::slots::day_slot_grid;

/// What a read path does when the deciding data cannot be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Permit the operation: offer the full slot grid as if nothing were
    /// filtered out.
    FailOpen,
    /// Block the operation: report the slot as unavailable.
    FailClosed,
}

/// The resolver fails OPEN: a schedule or leave read error degrades to the
/// full unfiltered grid rather than blocking booking. The occupancy check in
/// the appointment cell deliberately takes the opposite policy. Do not "fix"
/// this asymmetry: losing bookings over an infrastructure hiccup costs more
/// than occasionally offering a slot that should have been filtered, while a
/// silent double-booking costs more than a wrongly blocked attempt.
pub const AVAILABILITY_READ_FAILURE: ReadFailurePolicy = ReadFailurePolicy::FailOpen;

/// Hard-coded midday boundary for half-day leave. This is a fixed clock
/// value, NOT the midpoint of the doctor's configured hours; recorded leaves
/// rely on this exact boundary, so it must not drift with schedule changes.
pub fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

/// Map a calendar date onto the schedule's weekday index (0 = Sunday).
pub fn weekday_index(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Filter the full day grid down to the candidate bookable slots, given the
/// weekday schedule row (if any) and the leave record (if any) for the date.
///
/// Pure so the resolver and its tests share one definition. Policy choices
/// encoded here:
/// - no schedule row at all means "assume always available", not "assume
///   closed" (absence of configuration must never cost a doctor bookings);
/// - working-window and break filters apply only when both bounds are set;
/// - half-day leave splits at the fixed 12:00 boundary regardless of the
///   configured working hours.
///
/// Filtering never reorders: output stays chronological.
pub fn filter_slots(
    grid: Vec<TimeSlot>,
    schedule: Option<&WeeklySchedule>,
    leave: Option<&LeaveRecord>,
) -> Vec<TimeSlot> {
    if let Some(leave) = leave {
        if leave.leave_type == LeaveType::FullDay {
            return vec![];
        }
    }

    let Some(schedule) = schedule else {
        // Fail open: no row configured for this weekday.
        return apply_half_day(grid, leave);
    };

    if !schedule.is_available {
        return vec![];
    }

    let mut slots = grid;

    if let (Some(start), Some(end)) = (schedule.start_time, schedule.end_time) {
        slots.retain(|slot| slot.value >= start && slot.value < end);
    }

    if let (Some(break_start), Some(break_end)) = (schedule.break_start, schedule.break_end) {
        slots.retain(|slot| slot.value < break_start || slot.value >= break_end);
    }

    apply_half_day(slots, leave)
}

fn apply_half_day(mut slots: Vec<TimeSlot>, leave: Option<&LeaveRecord>) -> Vec<TimeSlot> {
    match leave.map(|l| l.leave_type) {
        // Morning off: keep only slots from 12:00 onward.
        Some(LeaveType::HalfDayMorning) => slots.retain(|slot| slot.value >= midday()),
        // Evening off: keep only slots before 12:00.
        Some(LeaveType::HalfDayEvening) => slots.retain(|slot| slot.value < midday()),
        _ => {}
    }
    slots
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Candidate bookable slots for one doctor on one date.
    ///
    /// Answers "is this doctor theoretically working at this time" only; it
    /// does NOT consult the appointment ledger. Occupancy is a separate,
    /// later check made by the booking guard immediately before insert.
    ///
    /// This operation never surfaces a data-access error to the caller: per
    /// [`AVAILABILITY_READ_FAILURE`] any failed read degrades to the full
    /// unfiltered grid, logged as a warning.
    pub async fn get_available_slots(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Vec<TimeSlot> {
        debug!("Resolving availability for doctor {} on {}", doctor_id, date);

        let leave = match self.get_leave_for_date(doctor_id, date, auth_token).await {
            Ok(leave) => leave,
            Err(e) => {
                warn!(
                    "Leave lookup failed for doctor {} on {} ({}); failing open with full grid",
                    doctor_id, date, e
                );
                return day_slot_grid();
            }
        };

        // Full-day leave needs no further checks.
        if leave.as_ref().map(|l| l.leave_type) == Some(LeaveType::FullDay) {
            debug!("Doctor {} on full-day leave for {}", doctor_id, date);
            return vec![];
        }

        let day_of_week = weekday_index(date);
        let schedule = match self
            .get_schedule_for_day(doctor_id, day_of_week, auth_token)
            .await
        {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!(
                    "Schedule lookup failed for doctor {} weekday {} ({}); failing open with full grid",
                    doctor_id, day_of_week, e
                );
                return day_slot_grid();
            }
        };

        let slots = filter_slots(day_slot_grid(), schedule.as_ref(), leave.as_ref());
        debug!(
            "Doctor {} has {} candidate slots on {}",
            doctor_id,
            slots.len(),
            date
        );
        slots
    }

    async fn get_leave_for_date(
        &self,
        doctor_id: &str,
        date: NaiveDate,
        auth_token: Option<&str>,
    ) -> Result<Option<LeaveRecord>, DbError> {
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
                let leave: LeaveRecord = serde_json::from_value(row).map_err(|e| DbError::Api {
                    status: 200,
                    message: format!("Failed to parse leave record: {}", e),
                })?;
                Ok(Some(leave))
            }
            None => Ok(None),
        }
    }

    async fn get_schedule_for_day(
        &self,
        doctor_id: &str,
        day_of_week: i32,
        auth_token: Option<&str>,
    ) -> Result<Option<WeeklySchedule>, DbError> {
        let path = format!(
            "/rest/v1/doctor_weekly_schedules?doctor_id=eq.{}&day_of_week=eq.{}&limit=1",
            doctor_id, day_of_week
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        match result.into_iter().next() {
            Some(row) => {
                let schedule: WeeklySchedule =
                    serde_json::from_value(row).map_err(|e| DbError::Api {
                        status: 200,
                        message: format!("Failed to parse schedule row: {}", e),
                    })?;
                Ok(Some(schedule))
            }
            None => Ok(None),
        }
    }
}

// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use shared_database::DbError;

/// Serde helpers for the `"HH:MM"` wire shape used for all time-of-day
/// values. Accepts `"HH:MM:SS"` on input since Postgres `time` columns come
/// back with seconds.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn parse(s: &str) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid time: {}", s)))
    }
}

pub mod hhmm_option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => super::hhmm::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        match opt {
            Some(s) => super::hhmm::parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid time: {}", s))),
            None => Ok(None),
        }
    }
}

// ==============================================================================
// SCHEDULE STORE MODELS
// ==============================================================================

/// One weekly availability template row per doctor per weekday (0 = Sunday).
///
/// Absent `start_time`/`end_time` means the working window is not configured
/// for this weekday, which the resolver treats as "all slots available".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i32,
    pub is_available: bool,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_end: Option<NaiveTime>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertScheduleRequest {
    pub is_available: bool,
    #[serde(default, with = "hhmm_option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_start: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub break_end: Option<NaiveTime>,
}

// ==============================================================================
// LEAVE STORE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    FullDay,
    HalfDayMorning,
    HalfDayEvening,
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaveType::FullDay => write!(f, "full_day"),
            LeaveType::HalfDayMorning => write!(f, "half_day_morning"),
            LeaveType::HalfDayEvening => write!(f, "half_day_evening"),
        }
    }
}

/// At most one leave record exists per (doctor, date); leave type is never
/// mutated in place, a changed leave is a delete followed by a recreate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub leave_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeaveRequest {
    pub leave_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveStatus {
    pub on_leave: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LeaveStatus {
    pub fn none() -> Self {
        Self {
            on_leave: false,
            leave_type: None,
            reason: None,
        }
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

/// One bookable 30-minute unit, identified by its start time. Derived fresh
/// on every query, never persisted or cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    #[serde(with = "hhmm")]
    pub value: NaiveTime,
    pub label: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDayOfWeek(i32),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("Leave already logged for {0}")]
    DuplicateLeave(NaiveDate),

    #[error("Leave not found for {0}")]
    LeaveNotFound(NaiveDate),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbError> for ScheduleError {
    fn from(e: DbError) -> Self {
        ScheduleError::Database(e.to_string())
    }
}

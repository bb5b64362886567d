// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use schedule_cell::models::{hhmm, TimeSlot};
use shared_database::DbError;

// ==============================================================================
// LEDGER MODELS
// ==============================================================================

/// One committed appointment in the ledger.
///
/// Consistency contract: for a (doctor_id, appointment_date,
/// appointment_time) key, at most one row has a status other than
/// `cancelled`. Cancellation is a status change, never a row deletion, so
/// cancelled rows remain in the ledger but do not occupy the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub appointment_type: Option<String>,
    pub fees: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Whether a row with this status occupies its slot.
    pub fn occupies_slot(&self) -> bool {
        *self != AppointmentStatus::Cancelled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub appointment_type: Option<String>,
    pub fees: Option<f64>,
    /// Walk-ins enter the ledger directly at `in_progress`, bypassing
    /// `scheduled`/`confirmed`.
    #[serde(default)]
    pub walk_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub new_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

/// Result of the advisory occupancy pre-check. `error` is set only on the
/// fail-closed path, where a data-access failure reports the slot as taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SlotAvailability {
    pub fn open() -> Self {
        Self {
            available: true,
            error: None,
        }
    }

    pub fn taken() -> Self {
        Self {
            available: false,
            error: None,
        }
    }

    pub fn unknown(error: String) -> Self {
        Self {
            available: false,
            error: Some(error),
        }
    }
}

/// Calendar day view: the resolver's candidate slots alongside the booked
/// appointments so the UI can mark availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub available_slots: Vec<TimeSlot>,
    pub appointments: Vec<Appointment>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot just became unavailable")]
    SlotTaken,

    #[error("Could not verify slot occupancy: {0}")]
    SlotCheckFailed(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DbError> for AppointmentError {
    fn from(e: DbError) -> Self {
        match e {
            // Storage-level uniqueness violation on the active-slot index:
            // the slot was taken between our advisory check and the write.
            DbError::Conflict(_) => AppointmentError::SlotTaken,
            DbError::NotFound(_) => AppointmentError::NotFound,
            other => AppointmentError::Database(other.to_string()),
        }
    }
}

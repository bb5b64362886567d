pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{LeaveRecord, LeaveStatus, LeaveType, TimeSlot, WeeklySchedule};
pub use services::availability::AvailabilityService;
pub use services::slots::day_slot_grid;

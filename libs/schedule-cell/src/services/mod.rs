pub mod availability;
pub mod leave;
pub mod schedule;
pub mod slots;

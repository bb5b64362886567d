pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AppointmentError, AppointmentStatus, SlotAvailability};
pub use services::guard::BookingGuard;
pub use services::lifecycle::AppointmentLifecycleService;

pub mod booking;
pub mod calendar;
pub mod guard;
pub mod lifecycle;

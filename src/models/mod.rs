//! Data models for the agenda

pub mod appointment;
pub mod enums;
pub mod reference;
pub mod schedule_block;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentDraft, NewAppointment, Offering};
pub use enums::{AppointmentStatus, StatusFilter, Weekday};
pub use reference::{Barber, Client, Package, ReferenceSnapshot, Service};
pub use schedule_block::{ScheduleBlock, ScheduleBlockDraft};

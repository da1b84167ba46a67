//! Appointment model, booking draft and row normalization

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::enums::AppointmentStatus;
use super::reference::{Package, Service};
use crate::error::{AppError, AppResult};

/// Duration assumed for stored rows that carry no usable duration
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

// ---------------------------------------------------------------------------
// Offering
// ---------------------------------------------------------------------------

/// What the appointment was booked for: a single service or a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Offering {
    Service(i32),
    Package(i32),
}

impl Offering {
    /// Build from the two nullable references; exactly one must be set.
    pub fn from_ids(service_id: Option<i32>, package_id: Option<i32>) -> AppResult<Self> {
        match (service_id, package_id) {
            (Some(id), None) => Ok(Offering::Service(id)),
            (None, Some(id)) => Ok(Offering::Package(id)),
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Choose either a service or a package, not both".to_string(),
            )),
            (None, None) => Err(AppError::Validation(
                "A service or a package is required".to_string(),
            )),
        }
    }

    pub fn service_id(&self) -> Option<i32> {
        match self {
            Offering::Service(id) => Some(*id),
            Offering::Package(_) => None,
        }
    }

    pub fn package_id(&self) -> Option<i32> {
        match self {
            Offering::Package(id) => Some(*id),
            Offering::Service(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Appointment
// ---------------------------------------------------------------------------

/// A booked appointment as held in the local cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Appointment {
    pub id: i32,
    pub client_id: i32,
    pub client_name: String,
    pub client_phone: String,
    pub barber_id: i32,
    pub barber_name: String,
    pub offering: Offering,
    /// Service or package name
    pub offering_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl Appointment {
    pub fn start_hour(&self) -> u32 {
        self.time.hour()
    }

    /// Number of hour cells covered, counted from the start hour:
    /// `ceil(duration / 60)`, at least one.
    pub fn span_hours(&self) -> u32 {
        let minutes = self.duration_minutes.max(1) as u32;
        minutes.div_ceil(60)
    }

    /// Whether the appointment covers the hour cell `hour`
    pub fn occupies_hour(&self, hour: u32) -> bool {
        let start = self.start_hour();
        hour >= start && hour < start + self.span_hours()
    }
}

/// Fields submitted to the appointment store on create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub client_id: i32,
    pub barber_id: i32,
    pub offering: Offering,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// AppointmentDraft
// ---------------------------------------------------------------------------

/// Booking form as filled in by the user (create and edit)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_offering_choice", skip_on_field_errors = false))]
pub struct AppointmentDraft {
    #[validate(required(message = "Client is required"))]
    pub client_id: Option<i32>,
    #[validate(required(message = "Barber is required"))]
    pub barber_id: Option<i32>,
    pub service_id: Option<i32>,
    pub package_id: Option<i32>,
    /// Display name of the selected service/package
    pub offering_name: Option<String>,
    pub price: Option<Decimal>,
    pub duration_minutes: Option<i32>,
    /// Date (YYYY-MM-DD)
    #[validate(required(message = "Date is required"))]
    pub date: Option<String>,
    /// Time (HH:MM)
    #[validate(required(message = "Time is required"))]
    pub time: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

fn validate_offering_choice(draft: &AppointmentDraft) -> Result<(), ValidationError> {
    match Offering::from_ids(draft.service_id, draft.package_id) {
        Ok(_) => Ok(()),
        Err(e) => {
            let mut err = ValidationError::new("offering");
            err.message = Some(Cow::Owned(e.user_message()));
            Err(err)
        }
    }
}

/// A draft that passed validation, with parsed values
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedDraft {
    pub client_id: i32,
    pub barber_id: i32,
    pub offering: Offering,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// As submitted; create and edit resolve a missing status differently
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    /// Draft for a click on an empty grid cell: date and hour pre-filled
    pub fn for_cell(date: NaiveDate, hour: u32) -> Self {
        Self {
            date: Some(date.format("%Y-%m-%d").to_string()),
            time: Some(format!("{:02}:00", hour)),
            status: Some(AppointmentStatus::Pendiente),
            ..Self::default()
        }
    }

    /// Edit form for an existing appointment
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            client_id: Some(appointment.client_id),
            barber_id: Some(appointment.barber_id),
            service_id: appointment.offering.service_id(),
            package_id: appointment.offering.package_id(),
            offering_name: Some(appointment.offering_name.clone()),
            price: Some(appointment.price),
            duration_minutes: Some(appointment.duration_minutes),
            date: Some(appointment.date.format("%Y-%m-%d").to_string()),
            time: Some(appointment.time.format("%H:%M").to_string()),
            status: Some(appointment.status),
            notes: appointment.notes.clone(),
        }
    }

    /// Select a service; clears any package and overwrites name, price and duration
    pub fn select_service(&mut self, service: &Service) {
        self.service_id = Some(service.id);
        self.package_id = None;
        self.offering_name = Some(service.name.clone());
        self.price = Some(service.price);
        self.duration_minutes = Some(service.duration_minutes);
    }

    /// Select a package; clears any service and overwrites name, price and duration
    pub fn select_package(&mut self, package: &Package) {
        self.package_id = Some(package.id);
        self.service_id = None;
        self.offering_name = Some(package.name.clone());
        self.price = Some(package.price);
        self.duration_minutes = Some(package.duration_minutes);
    }

    /// Run field validation and parse date/time
    pub fn check(&self) -> AppResult<CheckedDraft> {
        self.validate()?;

        let offering = Offering::from_ids(self.service_id, self.package_id)?;
        let date = self
            .date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
            .ok_or_else(|| AppError::Validation("Invalid date (use YYYY-MM-DD)".to_string()))?;
        let time = self
            .time
            .as_deref()
            .and_then(parse_time)
            .ok_or_else(|| AppError::Validation("Invalid time (use HH:MM)".to_string()))?;

        Ok(CheckedDraft {
            client_id: self.client_id.unwrap_or_default(),
            barber_id: self.barber_id.unwrap_or_default(),
            offering,
            date,
            time,
            status: self.status,
            notes: self
                .notes
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        })
    }
}

/// Parse `HH:MM`, also accepting `HH:MM:SS`
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Appointment row as read from the store; every column may be missing
#[derive(Debug, Clone, Default, FromRow)]
pub struct AppointmentRow {
    pub id: i32,
    pub client_id: Option<i32>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub barber_id: Option<i32>,
    pub barber_name: Option<String>,
    pub service_id: Option<i32>,
    pub service_name: Option<String>,
    pub package_id: Option<i32>,
    pub package_name: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = AppError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let missing = |field: &str| AppError::Internal(format!("appointment {} has no {}", id, field));

        let client_id = row.client_id.ok_or_else(|| missing("client"))?;
        let barber_id = row.barber_id.ok_or_else(|| missing("barber"))?;
        let date = row.appointment_date.ok_or_else(|| missing("date"))?;
        let time = row.appointment_time.ok_or_else(|| missing("time"))?;
        let offering = Offering::from_ids(row.service_id, row.package_id)
            .map_err(|e| AppError::Internal(format!("appointment {}: {}", id, e.user_message())))?;

        let offering_name = match offering {
            Offering::Service(_) => row.service_name,
            Offering::Package(_) => row.package_name,
        }
        .unwrap_or_default();

        let status = match row.status.as_deref() {
            Some(s) => s.parse().unwrap_or_else(|_| {
                tracing::warn!("Appointment {} has unknown status '{}', using Pendiente", id, s);
                AppointmentStatus::Pendiente
            }),
            None => AppointmentStatus::Pendiente,
        };

        Ok(Appointment {
            id,
            client_id,
            client_name: row.client_name.unwrap_or_default(),
            client_phone: row.client_phone.unwrap_or_default(),
            barber_id,
            barber_name: row.barber_name.unwrap_or_default(),
            offering,
            offering_name,
            date,
            time,
            duration_minutes: row
                .duration_minutes
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            price: row.price.unwrap_or(Decimal::ZERO).max(Decimal::ZERO),
            status,
            notes: row.notes,
        })
    }
}

//! Shared domain enums (appointment status, weekday, status filter)

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Appointment status.
///
/// `Pendiente` is the initial state and `Completada` the terminal one. The
/// standalone status change accepts any target, so no transition table is
/// enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum AppointmentStatus {
    #[default]
    Pendiente,
    Confirmada,
    #[serde(rename = "En Proceso", alias = "EnProceso")]
    EnProceso,
    Completada,
    Cancelada,
}

impl AppointmentStatus {
    /// Direct targets offered by the status menu, in display order
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pendiente,
        AppointmentStatus::Confirmada,
        AppointmentStatus::EnProceso,
        AppointmentStatus::Completada,
        AppointmentStatus::Cancelada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pendiente => "Pendiente",
            AppointmentStatus::Confirmada => "Confirmada",
            AppointmentStatus::EnProceso => "En Proceso",
            AppointmentStatus::Completada => "Completada",
            AppointmentStatus::Cancelada => "Cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completada)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pendiente" => Ok(AppointmentStatus::Pendiente),
            "confirmada" => Ok(AppointmentStatus::Confirmada),
            "enproceso" => Ok(AppointmentStatus::EnProceso),
            "completada" => Ok(AppointmentStatus::Completada),
            "cancelada" => Ok(AppointmentStatus::Cancelada),
            _ => Err(AppError::Validation(format!("Unknown appointment status '{}'", s))),
        }
    }
}

// ---------------------------------------------------------------------------
// Weekday
// ---------------------------------------------------------------------------

/// Day of the week, Monday first (index 0=Lunes, 6=Domingo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum Weekday {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles", alias = "Miercoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(rename = "Sábado", alias = "Sabado")]
    Sabado,
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    /// Position in the week (0=Monday)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Lunes => "Lunes",
            Weekday::Martes => "Martes",
            Weekday::Miercoles => "Miércoles",
            Weekday::Jueves => "Jueves",
            Weekday::Viernes => "Viernes",
            Weekday::Sabado => "Sábado",
            Weekday::Domingo => "Domingo",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl TryFrom<i16> for Weekday {
    type Error = AppError;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        usize::try_from(v)
            .ok()
            .and_then(Weekday::from_index)
            .ok_or_else(|| AppError::Validation(format!("Invalid day of week {}", v)))
    }
}

impl From<Weekday> for i16 {
    fn from(d: Weekday) -> Self {
        d as i16
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Weekday {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' => 'a',
                'é' => 'e',
                _ => c,
            })
            .collect();
        match folded.as_str() {
            "lunes" => Ok(Weekday::Lunes),
            "martes" => Ok(Weekday::Martes),
            "miercoles" => Ok(Weekday::Miercoles),
            "jueves" => Ok(Weekday::Jueves),
            "viernes" => Ok(Weekday::Viernes),
            "sabado" => Ok(Weekday::Sabado),
            "domingo" => Ok(Weekday::Domingo),
            _ => Err(AppError::Validation(format!("Unknown weekday '{}'", s))),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusFilter
// ---------------------------------------------------------------------------

/// Status filter applied to grid occupants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" | "todas" => Ok(StatusFilter::All),
            _ => s.parse().map(StatusFilter::Only),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_labels() {
        let json = serde_json::to_string(&AppointmentStatus::EnProceso).unwrap();
        assert_eq!(json, "\"En Proceso\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"EnProceso\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::EnProceso);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("en proceso".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::EnProceso);
        assert_eq!("Completada".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Completada);
        assert!("done".parse::<AppointmentStatus>().is_err());
        assert!(AppointmentStatus::Completada.is_terminal());
        assert!(!AppointmentStatus::Cancelada.is_terminal());
    }

    #[test]
    fn test_weekday_parsing_ignores_accents() {
        assert_eq!("Miércoles".parse::<Weekday>().unwrap(), Weekday::Miercoles);
        assert_eq!("sabado".parse::<Weekday>().unwrap(), Weekday::Sabado);
        assert_eq!(Weekday::try_from(6i16).unwrap(), Weekday::Domingo);
        assert!(Weekday::try_from(7i16).is_err());
        assert_eq!(Weekday::from(chrono::Weekday::Mon), Weekday::Lunes);
    }

    #[test]
    fn test_status_filter() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        let only: StatusFilter = "Pendiente".parse().unwrap();
        assert!(only.matches(AppointmentStatus::Pendiente));
        assert!(!only.matches(AppointmentStatus::Completada));
        assert!(StatusFilter::All.matches(AppointmentStatus::Cancelada));
    }
}

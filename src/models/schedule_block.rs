//! Barber weekly availability blocks

use std::borrow::Cow;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::appointment::parse_time;
use super::enums::Weekday;
use super::reference::Barber;
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// ScheduleBlock
// ---------------------------------------------------------------------------

/// A recurring weekly availability interval for one barber.
///
/// `id` is `Some` when the block exists in storage and `None` when it only
/// exists in an edited draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleBlock {
    pub id: Option<i32>,
    pub barber_id: i32,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub active: bool,
}

impl ScheduleBlock {
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Same weekday and intersecting `[start, end)` intervals
    pub fn overlaps(&self, other: &Self) -> bool {
        self.weekday == other.weekday
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }
}

// ---------------------------------------------------------------------------
// ScheduleBlockDraft
// ---------------------------------------------------------------------------

/// One row of the weekly schedule editor
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_block_order", skip_on_field_errors = true))]
pub struct ScheduleBlockDraft {
    /// Present when the row was loaded from storage
    pub id: Option<i32>,
    #[validate(required(message = "A weekday must be selected"))]
    pub weekday: Option<Weekday>,
    /// Start time (HH:MM)
    #[validate(required(message = "Start time is required"))]
    pub start_time: Option<String>,
    /// End time (HH:MM)
    #[validate(required(message = "End time is required"))]
    pub end_time: Option<String>,
    /// Defaults to active
    pub active: Option<bool>,
}

fn validate_block_order(draft: &ScheduleBlockDraft) -> Result<(), ValidationError> {
    let start = draft.start_time.as_deref().and_then(parse_time);
    let end = draft.end_time.as_deref().and_then(parse_time);
    let message = match (start, end) {
        (None, _) => "Invalid start time (use HH:MM)",
        (_, None) => "Invalid end time (use HH:MM)",
        (Some(s), Some(e)) if s >= e => "Start time must be before end time",
        _ => return Ok(()),
    };
    let mut err = ValidationError::new("block_order");
    err.message = Some(Cow::Borrowed(message));
    Err(err)
}

impl ScheduleBlockDraft {
    pub fn from_block(block: &ScheduleBlock) -> Self {
        Self {
            id: block.id,
            weekday: Some(block.weekday),
            start_time: Some(block.start_time.format("%H:%M").to_string()),
            end_time: Some(block.end_time.format("%H:%M").to_string()),
            active: Some(block.active),
        }
    }

    /// Validate the row and turn it into a block owned by `barber_id`
    pub fn check(&self, barber_id: i32) -> AppResult<ScheduleBlock> {
        self.validate()?;

        let weekday = self
            .weekday
            .ok_or_else(|| AppError::Validation("A weekday must be selected".to_string()))?;
        let start_time = self
            .start_time
            .as_deref()
            .and_then(parse_time)
            .ok_or_else(|| AppError::Validation("Invalid start time (use HH:MM)".to_string()))?;
        let end_time = self
            .end_time
            .as_deref()
            .and_then(parse_time)
            .ok_or_else(|| AppError::Validation("Invalid end time (use HH:MM)".to_string()))?;

        Ok(ScheduleBlock {
            id: self.id,
            barber_id,
            weekday,
            start_time,
            end_time,
            active: self.active.unwrap_or(true),
        })
    }
}

/// Save-week request: the full desired set for one barber
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SaveWeekRequest {
    pub blocks: Vec<ScheduleBlockDraft>,
}

/// Blocks of one barber with their weekday summary
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BarberSchedule {
    pub barber: Barber,
    pub blocks: Vec<ScheduleBlock>,
    /// e.g. "Lunes, Martes +3 más"
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Block row as read from the store
#[derive(Debug, Clone, Default, FromRow)]
pub struct ScheduleBlockRow {
    pub id: i32,
    pub barber_id: Option<i32>,
    /// Day of week (0=Monday, 6=Sunday)
    pub day_of_week: Option<i16>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub active: Option<bool>,
}

impl TryFrom<ScheduleBlockRow> for ScheduleBlock {
    type Error = AppError;

    fn try_from(row: ScheduleBlockRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let malformed = |what: &str| AppError::Internal(format!("schedule block {}: {}", id, what));

        let barber_id = row.barber_id.ok_or_else(|| malformed("no barber"))?;
        let weekday = row
            .day_of_week
            .ok_or_else(|| malformed("no day of week"))
            .and_then(|d| Weekday::try_from(d).map_err(|_| malformed("invalid day of week")))?;
        let start_time = row.start_time.ok_or_else(|| malformed("no start time"))?;
        let end_time = row.end_time.ok_or_else(|| malformed("no end time"))?;
        if start_time >= end_time {
            return Err(malformed("start time is not before end time"));
        }

        Ok(ScheduleBlock {
            id: Some(id),
            barber_id,
            weekday,
            start_time,
            end_time,
            active: row.active.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(weekday: Option<Weekday>, start: Option<&str>, end: Option<&str>) -> ScheduleBlockDraft {
        ScheduleBlockDraft {
            id: None,
            weekday,
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            active: None,
        }
    }

    #[test]
    fn test_check_valid_block() {
        let block = draft(Some(Weekday::Martes), Some("09:00"), Some("13:00")).check(2).unwrap();
        assert_eq!(block.barber_id, 2);
        assert_eq!(block.weekday, Weekday::Martes);
        assert!(block.active);
        assert!(!block.is_persisted());
    }

    #[test]
    fn test_check_requires_weekday() {
        match draft(None, Some("09:00"), Some("13:00")).check(2) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "A weekday must be selected"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_both_times() {
        assert!(draft(Some(Weekday::Lunes), None, Some("13:00")).check(2).is_err());
        assert!(draft(Some(Weekday::Lunes), Some("09:00"), None).check(2).is_err());
    }

    #[test]
    fn test_check_requires_start_before_end() {
        match draft(Some(Weekday::Lunes), Some("13:00"), Some("09:00")).check(2) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Start time must be before end time"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(draft(Some(Weekday::Lunes), Some("09:00"), Some("09:00")).check(2).is_err());
    }

    #[test]
    fn test_overlaps() {
        let a = draft(Some(Weekday::Lunes), Some("09:00"), Some("13:00")).check(1).unwrap();
        let b = draft(Some(Weekday::Lunes), Some("12:00"), Some("18:00")).check(1).unwrap();
        let c = draft(Some(Weekday::Lunes), Some("13:00"), Some("18:00")).check(1).unwrap();
        let d = draft(Some(Weekday::Martes), Some("09:00"), Some("13:00")).check(1).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_row_normalization() {
        let row = ScheduleBlockRow {
            id: 9,
            barber_id: Some(2),
            day_of_week: Some(4),
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            end_time: NaiveTime::from_hms_opt(14, 0, 0),
            active: None,
        };
        let block = ScheduleBlock::try_from(row).unwrap();
        assert_eq!(block.id, Some(9));
        assert_eq!(block.weekday, Weekday::Viernes);
        assert!(block.active);

        let bad = ScheduleBlockRow {
            id: 10,
            barber_id: Some(2),
            day_of_week: Some(9),
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            end_time: NaiveTime::from_hms_opt(14, 0, 0),
            active: Some(true),
        };
        assert!(ScheduleBlock::try_from(bad).is_err());
    }
}

//! Week windows for the appointment grid.
//!
//! A window is seven consecutive dates starting at `today + 7 * offset`
//! days. Entry `i` carries weekday label `i` (Lunes first); the labels are
//! positional and do not look at the calendar weekday of the anchor.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Weekday;

/// One column of the weekly grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WeekDay {
    pub weekday: Weekday,
    /// Short date shown in the column header (dd/mm)
    pub display_date: String,
    pub iso_date: NaiveDate,
}

/// The seven days shown by the grid for a given week offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WeekWindow {
    pub offset_weeks: i64,
    pub days: Vec<WeekDay>,
}

impl WeekWindow {
    /// Compute the window `offset_weeks` weeks away from `today`.
    ///
    /// Returns `None` only when the dates fall outside the supported
    /// calendar range.
    pub fn compute(offset_weeks: i64, today: NaiveDate) -> Option<Self> {
        let anchor = shift_days(today, offset_weeks.checked_mul(7)?)?;

        let days = Weekday::ALL
            .iter()
            .enumerate()
            .map(|(i, weekday)| {
                let iso_date = anchor.checked_add_days(Days::new(i as u64))?;
                Some(WeekDay {
                    weekday: *weekday,
                    display_date: iso_date.format("%d/%m").to_string(),
                    iso_date,
                })
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self { offset_weeks, days })
    }

    /// Date shown under `weekday`
    pub fn iso_date_of(&self, weekday: Weekday) -> Option<NaiveDate> {
        self.days
            .iter()
            .find(|d| d.weekday == weekday)
            .map(|d| d.iso_date)
    }

    /// Column label for `date`, if the date is inside the window
    pub fn weekday_of(&self, date: NaiveDate) -> Option<Weekday> {
        self.days
            .iter()
            .find(|d| d.iso_date == date)
            .map(|d| d.weekday)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.iso_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.iso_date)
    }
}

/// The Monday on or before `date`
pub fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_week() {
        let window = WeekWindow::compute(0, ymd(2024, 6, 10)).unwrap();
        assert_eq!(window.days.len(), 7);
        assert_eq!(window.days[0].weekday, Weekday::Lunes);
        assert_eq!(window.days[0].iso_date, ymd(2024, 6, 10));
        assert_eq!(window.days[0].display_date, "10/06");
        assert_eq!(window.days[6].weekday, Weekday::Domingo);
        assert_eq!(window.days[6].iso_date, ymd(2024, 6, 16));
    }

    #[test]
    fn test_anchor_follows_offset() {
        let today = ymd(2024, 2, 26);
        for offset in [-52, -3, -1, 0, 1, 2, 10, 520] {
            let window = WeekWindow::compute(offset, today).unwrap();
            assert_eq!(window.days.len(), 7);
            let expected = shift_days(today, offset * 7).unwrap();
            assert_eq!(window.days[0].iso_date, expected);
            for pair in window.days.windows(2) {
                assert!(pair[0].iso_date < pair[1].iso_date);
            }
        }
    }

    #[test]
    fn test_crosses_month_and_leap_day() {
        let window = WeekWindow::compute(0, ymd(2024, 2, 26)).unwrap();
        assert_eq!(window.days[3].iso_date, ymd(2024, 2, 29));
        assert_eq!(window.days[4].iso_date, ymd(2024, 3, 1));
        assert_eq!(window.days[4].display_date, "01/03");
    }

    #[test]
    fn test_labels_are_positional() {
        // 2024-06-12 is a Wednesday; the first column is still labelled Lunes
        let window = WeekWindow::compute(0, ymd(2024, 6, 12)).unwrap();
        assert_eq!(window.iso_date_of(Weekday::Lunes), Some(ymd(2024, 6, 12)));
        assert_eq!(window.weekday_of(ymd(2024, 6, 18)), Some(Weekday::Domingo));
        assert_eq!(window.weekday_of(ymd(2024, 6, 19)), None);
    }

    #[test]
    fn test_out_of_range_offset() {
        assert!(WeekWindow::compute(i64::MAX, ymd(2024, 6, 10)).is_none());
        assert!(WeekWindow::compute(i64::MIN / 7, ymd(2024, 6, 10)).is_none());
    }

    #[test]
    fn test_monday_on_or_before() {
        assert_eq!(monday_on_or_before(ymd(2024, 6, 12)), ymd(2024, 6, 10));
        assert_eq!(monday_on_or_before(ymd(2024, 6, 10)), ymd(2024, 6, 10));
        assert_eq!(monday_on_or_before(ymd(2024, 6, 16)), ymd(2024, 6, 10));
    }
}

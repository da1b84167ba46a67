//! Slot occupancy: which appointments cover a (weekday, hour) cell.
//!
//! An appointment starting at hour `H` with duration `D` minutes occupies
//! every hour cell `h` with `H <= h < H + ceil(D / 60)`. Search and status
//! filters are applied after interval matching and are conjunctive.
//! Results keep the order of the input collection.

use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::week::WeekWindow;
use crate::models::{Appointment, StatusFilter, Weekday};

/// Free-text search plus status filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFilter {
    search: String,
    pub status: StatusFilter,
}

impl GridFilter {
    pub fn new(search: &str, status: StatusFilter) -> Self {
        Self {
            search: search.trim().to_lowercase(),
            status,
        }
    }

    /// Case-insensitive substring match over client name, phone and
    /// service/package name; an empty term matches everything.
    pub fn matches_search(&self, appointment: &Appointment) -> bool {
        if self.search.is_empty() {
            return true;
        }
        [
            &appointment.client_name,
            &appointment.client_phone,
            &appointment.offering_name,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&self.search))
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.matches_search(appointment) && self.status.matches(appointment.status)
    }
}

/// Read-only occupancy view over an appointment collection and a week window
#[derive(Debug, Clone)]
pub struct SlotOccupancy<'a> {
    window: &'a WeekWindow,
    appointments: &'a [Appointment],
    filter: GridFilter,
}

impl<'a> SlotOccupancy<'a> {
    pub fn new(window: &'a WeekWindow, appointments: &'a [Appointment]) -> Self {
        Self {
            window,
            appointments,
            filter: GridFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: GridFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Appointments dated on the window day labelled `weekday`
    pub fn cells_for(&self, weekday: Weekday) -> Vec<&'a Appointment> {
        match self.window.iso_date_of(weekday) {
            Some(date) => self.on_date(date).collect(),
            None => Vec::new(),
        }
    }

    /// Filtered appointments covering hour cell `hour` on `weekday`
    pub fn occupants_of(&self, weekday: Weekday, hour: u32) -> Vec<&'a Appointment> {
        self.cells_for(weekday)
            .into_iter()
            .filter(|a| a.occupies_hour(hour))
            .filter(|a| self.filter.matches(a))
            .collect()
    }

    /// Full grid: one row per hour in `hours`, one cell per window day
    pub fn grid(&self, hours: Range<u32>) -> WeekGrid {
        let rows = hours
            .map(|hour| GridRow {
                hour,
                cells: self
                    .window
                    .days
                    .iter()
                    .map(|day| GridCell {
                        weekday: day.weekday,
                        iso_date: day.iso_date,
                        occupants: self
                            .occupants_of(day.weekday, hour)
                            .into_iter()
                            .map(|a| CellOccupant {
                                starts_here: a.start_hour() == hour,
                                appointment: a.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        WeekGrid {
            window: self.window.clone(),
            rows,
        }
    }

    fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &'a Appointment> {
        self.appointments.iter().filter(move |a| a.date == date)
    }
}

/// An appointment placed in a cell
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CellOccupant {
    /// True in the cell of the start hour, false in continuation cells
    pub starts_here: bool,
    pub appointment: Appointment,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridCell {
    pub weekday: Weekday,
    pub iso_date: NaiveDate,
    pub occupants: Vec<CellOccupant>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GridRow {
    pub hour: u32,
    pub cells: Vec<GridCell>,
}

/// Weekly grid served to the console
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekGrid {
    pub window: WeekWindow,
    pub rows: Vec<GridRow>,
}

//! Weekly grid endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{Appointment, StatusFilter, Weekday},
    scheduling::{monday_on_or_before, GridFilter, WeekGrid, WeekWindow},
    AppState,
};

/// Week selection and grid filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct WeekQuery {
    /// Weeks away from the current one (negative for past weeks)
    pub offset: Option<i64>,
    /// Matches client name, phone or service/package name
    pub search: Option<String>,
    /// Status label, or "all"
    pub status: Option<String>,
}

impl WeekQuery {
    fn filter(&self) -> AppResult<GridFilter> {
        let status: StatusFilter = self.status.as_deref().unwrap_or_default().parse()?;
        Ok(GridFilter::new(self.search.as_deref().unwrap_or_default(), status))
    }
}

fn window_for(state: &AppState, offset: i64) -> AppResult<WeekWindow> {
    let today = Local::now().date_naive();
    let anchor = if state.config.scheduling.align_weeks_to_monday {
        monday_on_or_before(today)
    } else {
        today
    };
    WeekWindow::compute(offset, anchor)
        .ok_or_else(|| AppError::Validation(format!("Week offset {} is out of range", offset)))
}

/// Weekly grid of appointments
#[utoipa::path(
    get,
    path = "/agenda/week",
    tag = "agenda",
    params(WeekQuery),
    responses(
        (status = 200, description = "Grid for the requested week", body = WeekGrid),
        (status = 400, description = "Invalid offset or status")
    )
)]
pub async fn week_grid(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> AppResult<Json<WeekGrid>> {
    let window = window_for(&state, query.offset.unwrap_or(0))?;
    let grid = state
        .services
        .appointments
        .week_grid(&window, query.filter()?, state.config.scheduling.grid_hours())
        .await;
    Ok(Json(grid))
}

/// Appointments covering one grid cell
#[utoipa::path(
    get,
    path = "/agenda/week/{weekday}/{hour}",
    tag = "agenda",
    params(
        ("weekday" = Weekday, Path, description = "Weekday label (Lunes..Domingo)"),
        ("hour" = u32, Path, description = "Hour of day (0-23)"),
        WeekQuery
    ),
    responses(
        (status = 200, description = "Occupants of the cell", body = Vec<Appointment>),
        (status = 400, description = "Invalid hour, offset or status")
    )
)]
pub async fn slot_occupants(
    State(state): State<AppState>,
    Path((weekday, hour)): Path<(Weekday, u32)>,
    Query(query): Query<WeekQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    if hour > 23 {
        return Err(AppError::Validation(format!("Hour {} is out of range", hour)));
    }
    let window = window_for(&state, query.offset.unwrap_or(0))?;
    let occupants = state
        .services
        .appointments
        .slot_occupants(&window, weekday, hour, query.filter()?)
        .await;
    Ok(Json(occupants))
}

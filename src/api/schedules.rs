//! Barber schedule endpoints (weekly availability blocks)

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        schedule_block::{BarberSchedule, SaveWeekRequest},
        ScheduleBlock,
    },
    services::schedule_blocks::ReconcileReport,
    AppState,
};

/// Every active barber with their blocks
#[utoipa::path(
    get,
    path = "/schedules",
    tag = "schedules",
    responses(
        (status = 200, description = "Schedule overview", body = Vec<BarberSchedule>)
    )
)]
pub async fn overview(State(state): State<AppState>) -> AppResult<Json<Vec<BarberSchedule>>> {
    let overview = state.services.schedule_blocks.overview().await?;
    Ok(Json(overview))
}

/// Blocks of one barber
#[utoipa::path(
    get,
    path = "/schedules/barbers/{barber_id}",
    tag = "schedules",
    params(("barber_id" = i32, Path, description = "Barber ID")),
    responses(
        (status = 200, description = "Barber blocks", body = Vec<ScheduleBlock>)
    )
)]
pub async fn get_barber_blocks(
    State(state): State<AppState>,
    Path(barber_id): Path<i32>,
) -> Json<Vec<ScheduleBlock>> {
    Json(state.services.schedule_blocks.list_by_barber(barber_id).await)
}

/// Replace a barber's week with the submitted blocks
#[utoipa::path(
    put,
    path = "/schedules/barbers/{barber_id}",
    tag = "schedules",
    params(("barber_id" = i32, Path, description = "Barber ID")),
    request_body = SaveWeekRequest,
    responses(
        (status = 200, description = "Reconciliation report", body = ReconcileReport),
        (status = 400, description = "Invalid block or barber")
    )
)]
pub async fn save_week(
    State(state): State<AppState>,
    Path(barber_id): Path<i32>,
    Json(data): Json<SaveWeekRequest>,
) -> AppResult<Json<ReconcileReport>> {
    let report = state
        .services
        .schedule_blocks
        .save_week(barber_id, &data.blocks)
        .await?;
    Ok(Json(report))
}

/// Remove every block of a barber
#[utoipa::path(
    delete,
    path = "/schedules/barbers/{barber_id}",
    tag = "schedules",
    params(("barber_id" = i32, Path, description = "Barber ID")),
    responses(
        (status = 200, description = "Reconciliation report", body = ReconcileReport)
    )
)]
pub async fn delete_week(
    State(state): State<AppState>,
    Path(barber_id): Path<i32>,
) -> AppResult<Json<ReconcileReport>> {
    let report = state.services.schedule_blocks.delete_week(barber_id).await?;
    Ok(Json(report))
}

/// Toggle a block between active and inactive
#[utoipa::path(
    post,
    path = "/schedules/blocks/{id}/toggle",
    tag = "schedules",
    params(("id" = i32, Path, description = "Schedule block ID")),
    responses(
        (status = 200, description = "Block after the toggle", body = ScheduleBlock),
        (status = 404, description = "Block not found")
    )
)]
pub async fn toggle_block(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ScheduleBlock>> {
    let block = state.services.schedule_blocks.toggle_active(id).await?;
    Ok(Json(block))
}

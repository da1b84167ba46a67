//! Appointment endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{Appointment, AppointmentDraft, AppointmentStatus},
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeleteQuery {
    /// Must be true for the deletion to proceed
    pub confirm: Option<bool>,
}

/// List cached appointments
#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    responses(
        (status = 200, description = "All appointments", body = Vec<Appointment>)
    )
)]
pub async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    Json(state.services.appointments.list().await)
}

/// Get one appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment", body = Appointment),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Appointment>> {
    let appointment = state.services.appointments.get(id).await?;
    Ok(Json(appointment))
}

/// Book an appointment
#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    request_body = AppointmentDraft,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Invalid or stale booking")
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(draft): Json<AppointmentDraft>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.services.appointments.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Edit an appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = AppointmentDraft,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 400, description = "Invalid or stale booking"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(draft): Json<AppointmentDraft>,
) -> AppResult<Json<Appointment>> {
    let appointment = state.services.appointments.edit(id, &draft).await?;
    Ok(Json(appointment))
}

/// Change the status of an appointment
#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    tag = "appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status changed", body = Appointment),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(data): Json<StatusUpdate>,
) -> AppResult<Json<Appointment>> {
    let appointment = state
        .services
        .appointments
        .change_status(id, data.status)
        .await?;
    Ok(Json(appointment))
}

/// Delete an appointment (requires `confirm=true`)
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    params(("id" = i32, Path, description = "Appointment ID"), DeleteQuery),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 400, description = "Deletion not confirmed"),
        (status = 404, description = "Appointment not found")
    )
)]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<StatusCode> {
    state
        .services
        .appointments
        .delete(id, query.confirm.unwrap_or(false))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

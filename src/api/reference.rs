//! Reference list endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::ReferenceSnapshot, services::load_reference, AppState};

/// Active barbers, services, packages and clients
#[utoipa::path(
    get,
    path = "/reference",
    tag = "reference",
    responses(
        (status = 200, description = "Active reference lists", body = ReferenceSnapshot)
    )
)]
pub async fn get_reference(State(state): State<AppState>) -> AppResult<Json<ReferenceSnapshot>> {
    let snapshot = load_reference(state.services.reference.as_ref()).await?;
    Ok(Json(snapshot))
}

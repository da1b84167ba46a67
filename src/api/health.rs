//! Liveness and readiness endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, services::Services, AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "ready"
    pub status: String,
    pub version: String,
    /// Appointments currently held in the agenda cache
    pub cached_appointments: usize,
    /// Schedule blocks currently held in the cache, all barbers
    pub cached_schedule_blocks: usize,
}

impl HealthResponse {
    pub async fn from_services(status: &str, services: &Services) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cached_appointments: services.appointments.cached_count().await,
            cached_schedule_blocks: services.schedule_blocks.cached_count().await,
        }
    }
}

/// Liveness, with the size of the in-memory agenda
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_services("healthy", &state.services).await)
}

/// Readiness: the database answers a trivial query
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;
    Ok(Json(HealthResponse::from_services("ready", &state.services).await))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::{MockAppointmentStore, MockReferenceData, MockScheduleBlockStore};
    use crate::services::{appointments::AppointmentsService, schedule_blocks::ScheduleBlocksService};

    #[tokio::test]
    async fn test_health_reports_cache_sizes() {
        let mut appointments = MockAppointmentStore::new();
        appointments.expect_list().returning(|| Ok(Vec::new()));
        let mut blocks = MockScheduleBlockStore::new();
        blocks.expect_list().returning(|| Ok(Vec::new()));
        let reference: Arc<dyn crate::repository::ReferenceData> = Arc::new(MockReferenceData::new());

        let services = Services {
            appointments: Arc::new(AppointmentsService::new(Arc::new(appointments), reference.clone())),
            schedule_blocks: Arc::new(ScheduleBlocksService::new(Arc::new(blocks), reference.clone(), false)),
            reference,
        };

        let health = HealthResponse::from_services("healthy", &services).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health.cached_appointments, 0);
        assert_eq!(health.cached_schedule_blocks, 0);
    }
}

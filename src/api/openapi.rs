//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{agenda, appointments, health, reference, schedules};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Barbería Agenda API",
        version = "1.0.0",
        description = "Appointment grid and barber schedule REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Agenda
        agenda::week_grid,
        agenda::slot_occupants,
        // Appointments
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::create_appointment,
        appointments::update_appointment,
        appointments::change_status,
        appointments::delete_appointment,
        // Schedules
        schedules::overview,
        schedules::get_barber_blocks,
        schedules::save_week,
        schedules::delete_week,
        schedules::toggle_block,
        // Reference
        reference::get_reference,
    ),
    components(
        schemas(
            // Agenda
            agenda::WeekQuery,
            crate::scheduling::WeekGrid,
            crate::scheduling::WeekWindow,
            crate::scheduling::WeekDay,
            crate::scheduling::occupancy::GridRow,
            crate::scheduling::occupancy::GridCell,
            crate::scheduling::occupancy::CellOccupant,
            // Appointments
            crate::models::Appointment,
            crate::models::AppointmentDraft,
            crate::models::Offering,
            crate::models::AppointmentStatus,
            crate::models::Weekday,
            appointments::StatusUpdate,
            // Schedules
            crate::models::ScheduleBlock,
            crate::models::ScheduleBlockDraft,
            crate::models::schedule_block::SaveWeekRequest,
            crate::models::schedule_block::BarberSchedule,
            crate::services::schedule_blocks::ReconcileReport,
            crate::services::schedule_blocks::BlockFailure,
            crate::services::schedule_blocks::BlockOperation,
            // Reference
            crate::models::ReferenceSnapshot,
            crate::models::Barber,
            crate::models::Service,
            crate::models::Package,
            crate::models::Client,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "agenda", description = "Weekly appointment grid"),
        (name = "appointments", description = "Appointment booking and lifecycle"),
        (name = "schedules", description = "Barber weekly availability"),
        (name = "reference", description = "Active barbers, services, packages and clients")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! API handlers for the agenda REST endpoints

pub mod agenda;
pub mod appointments;
pub mod health;
pub mod openapi;
pub mod reference;
pub mod schedules;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

/// Routes mounted under `/api/v1`
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Weekly grid
        .route("/agenda/week", get(agenda::week_grid))
        .route("/agenda/week/:weekday/:hour", get(agenda::slot_occupants))
        // Appointments
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route("/appointments/:id/status", put(appointments::change_status))
        // Barber schedules
        .route("/schedules", get(schedules::overview))
        .route(
            "/schedules/barbers/:barber_id",
            get(schedules::get_barber_blocks)
                .put(schedules::save_week)
                .delete(schedules::delete_week),
        )
        .route("/schedules/blocks/:id/toggle", post(schedules::toggle_block))
        // Reference lists
        .route("/reference", get(reference::get_reference))
        .with_state(state)
}

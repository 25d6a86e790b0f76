// libs/scheduling-cell/src/router.rs
use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    self, SchedulingState,
};

/// Appointment lifecycle routes, mounted under `/api/citas`.
pub fn scheduling_routes(state: SchedulingState) -> Router {
    Router::new()
        .route("/disponibles", get(handlers::list_available_slots))
        .route("/paciente/{paciente_id}", get(handlers::get_patient_appointments))
        .route("/agendar/{slot_id}", post(handlers::book_appointment))
        .route("/cancelar/{appointment_id}", post(handlers::cancel_appointment))
        .route("/reagendar", post(handlers::reschedule_appointment))
        .route("/seed", post(handlers::seed_slots))
        .route("/precio", get(handlers::price_quote))
        .with_state(state)
}

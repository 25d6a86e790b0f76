// libs/doctor-cell/src/router.rs
use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers::{self, DoctorState};

pub fn doctor_routes(state: DoctorState) -> Router {
    Router::new()
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/asignar/{paciente_id}", put(handlers::assign_doctor))
        .route("/reasignar/{paciente_id}", put(handlers::reassign_doctor))
        .with_state(state)
}

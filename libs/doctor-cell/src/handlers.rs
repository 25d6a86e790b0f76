// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::assignment::{AppointmentCanceller, AssignmentService};
use crate::services::directory::DoctorDirectory;

#[derive(Clone)]
pub struct DoctorState {
    pub directory: Arc<dyn DoctorDirectory>,
    pub assignment: Arc<AssignmentService>,
    pub canceller: Arc<dyn AppointmentCanceller>,
}

#[derive(Debug, Deserialize)]
pub struct AssignQuery {
    pub afiliado: Option<bool>,
}

fn map_doctor_error(e: DoctorError) -> AppError {
    match e {
        DoctorError::NotFound => AppError::NotFound("Doctor no encontrado".to_string()),
        DoctorError::NoDoctorsAvailable => {
            AppError::Conflict("No hay doctores disponibles".to_string())
        }
        DoctorError::CancellationFailed(msg) => AppError::Inconsistent(msg),
        DoctorError::Network(msg) => AppError::ExternalService(msg),
    }
}

/// Display fields for one doctor.
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = state
        .directory
        .get(doctor_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

/// Initial assignment, used by the registration/first-booking flow.
#[axum::debug_handler]
pub async fn assign_doctor(
    State(state): State<DoctorState>,
    Path(paciente_id): Path<Uuid>,
    Query(query): Query<AssignQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor = state
        .assignment
        .assign(paciente_id, query.afiliado.unwrap_or(false))
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctorId": doctor.id,
        "doctor": doctor,
    })))
}

/// Cascading doctor change: cancels the patient's active appointment, then
/// assigns a new random doctor.
#[axum::debug_handler]
pub async fn reassign_doctor(
    State(state): State<DoctorState>,
    Path(paciente_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let response = state
        .assignment
        .change_doctor(paciente_id, state.canceller.as_ref())
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "doctorId": response.doctor_id,
        "doctor": response.doctor,
        "citaCancelada": response.cancelled_appointment_id,
    })))
}

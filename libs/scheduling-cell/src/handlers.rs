// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use doctor_cell::services::directory::{resolve_doctor_displays, DoctorDirectory};
use shared_models::error::AppError;
use shared_models::SessionStore;

use crate::models::{AppointmentView, BookingError, SeedSlotRequest};
use crate::services::booking::BookingService;
use crate::services::pricing::{self, PricingRates};
use crate::services::slots::SlotRepository;

#[derive(Clone)]
pub struct SchedulingState {
    pub slots: Arc<SlotRepository>,
    pub booking: Arc<BookingService>,
    pub sessions: Arc<SessionStore>,
    pub directory: Arc<dyn DoctorDirectory>,
    pub rates: PricingRates,
}

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub paciente_id: Uuid,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Set by the reschedule flow, which legitimately holds an active
    /// appointment while browsing slots.
    pub reagendar: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PatientAppointmentsQuery {
    pub solo_programadas: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub paciente_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleQuery {
    pub id_cita_actual: Uuid,
    pub id_nueva_cita: Uuid,
    pub paciente_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    pub paciente_id: Uuid,
}

fn map_booking_error(e: BookingError) -> AppError {
    match e {
        BookingError::HistoryIncomplete | BookingError::TooLateToReschedule => {
            AppError::PreconditionFailed(e.to_string())
        }
        BookingError::AlreadyHasActiveAppointment | BookingError::SlotUnavailable => {
            AppError::Conflict(e.to_string())
        }
        BookingError::NotFound => AppError::NotFound(e.to_string()),
        BookingError::Network(msg) => AppError::ExternalService(msg),
    }
}

// ==============================================================================
// SLOT LISTING
// ==============================================================================

/// Open slots for the patient's assigned doctor, day-filterable. Gate
/// preconditions run first so the client can redirect to intake or to the
/// existing appointment instead of rendering a calendar it cannot book.
#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<SchedulingState>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .sessions
        .get(query.paciente_id)
        .ok_or_else(|| AppError::NotFound("Paciente sin sesión".to_string()))?;

    let doctor = session
        .assigned_doctor
        .ok_or_else(|| AppError::NotFound("Paciente sin doctor asignado".to_string()))?;

    let gate = state.booking.gate();
    if !gate
        .has_completed_history(query.paciente_id)
        .await
        .map_err(map_booking_error)?
    {
        return Err(map_booking_error(BookingError::HistoryIncomplete));
    }

    if !query.reagendar.unwrap_or(false) {
        let appointments = state.slots.appointments_for_patient(query.paciente_id);
        if gate.has_active_appointment(&appointments, Utc::now()).is_some() {
            return Err(map_booking_error(BookingError::AlreadyHasActiveAppointment));
        }
    }

    let slots = state
        .slots
        .list_available(doctor.doctor_id, query.from, query.to);

    Ok(Json(json!({
        "doctorId": doctor.doctor_id,
        "citas": slots,
    })))
}

// ==============================================================================
// APPOINTMENT LISTING
// ==============================================================================

/// All of a patient's appointments, doctor display fields enriched in
/// parallel, statuses derived at read time, sorted ascending.
#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<SchedulingState>,
    Path(paciente_id): Path<Uuid>,
    Query(query): Query<PatientAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let now = Utc::now();
    let appointments = state.slots.appointments_for_patient(paciente_id);

    let displays = resolve_doctor_displays(
        state.directory.as_ref(),
        appointments.iter().map(|a| a.doctor_id),
    )
    .await;

    let mut views: Vec<AppointmentView> = appointments
        .iter()
        .map(|a| {
            let display = displays.get(&a.doctor_id).cloned().unwrap_or_else(
                doctor_cell::models::DoctorDisplay::placeholder,
            );
            AppointmentView {
                id: a.id,
                doctor_id: a.doctor_id,
                doctor: display.nombre,
                especialidad: display.especialidad,
                fecha: a.fecha,
                hora: a.hora,
                estado: a.derived_status(now),
            }
        })
        .collect();

    if query.solo_programadas.unwrap_or(false) {
        views.retain(|v| v.estado == crate::models::AppointmentStatus::Scheduled);
    }

    Ok(Json(json!({ "citas": views })))
}

// ==============================================================================
// LIFECYCLE OPERATIONS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<SchedulingState>,
    Path(slot_id): Path<Uuid>,
    Query(query): Query<BookQuery>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .book_new(query.paciente_id, slot_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "cita": appointment,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<SchedulingState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .booking
        .cancel(appointment_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<SchedulingState>,
    Query(query): Query<RescheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .booking
        .reschedule(query.id_cita_actual, query.id_nueva_cita, query.paciente_id)
        .await
        .map_err(map_booking_error)?;

    Ok(Json(json!({
        "success": true,
        "cita": appointment,
    })))
}

// ==============================================================================
// ADMINISTRATIVE AND PRICING
// ==============================================================================

/// Administrative slot seeding.
#[axum::debug_handler]
pub async fn seed_slots(
    State(state): State<SchedulingState>,
    Json(requests): Json<Vec<SeedSlotRequest>>,
) -> Result<Json<Value>, AppError> {
    let created = state.slots.seed_slots(requests);
    Ok(Json(json!({
        "success": true,
        "citas": created,
    })))
}

/// Consultation cost for the patient's assigned doctor. Recomputed on every
/// call; affiliation or doctor changes are picked up immediately.
#[axum::debug_handler]
pub async fn price_quote(
    State(state): State<SchedulingState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .sessions
        .get(query.paciente_id)
        .ok_or_else(|| AppError::NotFound("Paciente sin sesión".to_string()))?;

    let doctor = session
        .assigned_doctor
        .ok_or_else(|| AppError::NotFound("Paciente sin doctor asignado".to_string()))?;

    let quote = pricing::quote(&state.rates, session.affiliated, &doctor.especialidad);
    Ok(Json(json!(quote)))
}

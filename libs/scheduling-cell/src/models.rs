// libs/scheduling-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE SCHEDULING MODELS
// ==============================================================================

/// One bookable unit of doctor time. Slots are created by administrative
/// seeding; the only legal way into `Ocupada` is a successful claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: SlotStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SlotStatus {
    #[serde(rename = "DISPONIBLE", alias = "disponible")]
    Available,
    #[serde(rename = "OCUPADA", alias = "ocupada")]
    Booked,
    #[serde(rename = "CANCELADA", alias = "cancelada")]
    Cancelled,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "DISPONIBLE"),
            SlotStatus::Booked => write!(f, "OCUPADA"),
            SlotStatus::Cancelled => write!(f, "CANCELADA"),
        }
    }
}

/// A patient's claim on a slot. Doctor and date/time are denormalized from
/// the slot so appointment lists render without a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub slot_id: Uuid,
    pub doctor_id: Uuid,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.fecha.and_time(self.hora).and_utc()
    }

    /// Status as observed at `now`. A Scheduled appointment whose time has
    /// passed reads as Completed; this is a read-time derivation, never a
    /// stored transition.
    pub fn derived_status(&self, now: DateTime<Utc>) -> AppointmentStatus {
        match self.estado {
            AppointmentStatus::Scheduled if self.scheduled_at() < now => {
                AppointmentStatus::Completed
            }
            other => other,
        }
    }

    /// Active means: not cancelled, and still in the future at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.estado != AppointmentStatus::Cancelled && self.scheduled_at() >= now
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppointmentStatus {
    #[serde(rename = "PROGRAMADA", alias = "programada")]
    Scheduled,
    #[serde(rename = "COMPLETADA", alias = "completada")]
    Completed,
    #[serde(rename = "CANCELADA", alias = "cancelada")]
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "PROGRAMADA"),
            AppointmentStatus::Completed => write!(f, "COMPLETADA"),
            AppointmentStatus::Cancelled => write!(f, "CANCELADA"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Administrative seeding payload for one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSlotRequest {
    pub doctor_id: Uuid,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
}

/// Appointment enriched with the doctor's display fields for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub doctor: String,
    pub especialidad: String,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: AppointmentStatus,
}

/// Derived consultation cost; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingQuote {
    pub afiliado: bool,
    pub especialidad: String,
    pub monto: f64,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BookingError {
    #[error("El historial médico no está completo")]
    HistoryIncomplete,

    #[error("El paciente ya tiene una cita activa")]
    AlreadyHasActiveAppointment,

    #[error("El horario ya no está disponible")]
    SlotUnavailable,

    #[error("Solo se permiten cambios con al menos 2 horas de anticipación")]
    TooLateToReschedule,

    #[error("Cita no encontrada")]
    NotFound,

    #[error("Error de conexión: {0}")]
    Network(String),
}

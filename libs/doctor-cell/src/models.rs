// libs/doctor-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display fields of a doctor as served by the clinic directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub nombre: String,
    pub especialidad: String,
    #[serde(default = "default_disponible")]
    pub disponible: bool,
}

fn default_disponible() -> bool {
    true
}

/// What list views need to render an appointment's doctor. Falls back to a
/// placeholder when the directory lookup fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorDisplay {
    pub nombre: String,
    pub especialidad: String,
}

impl DoctorDisplay {
    pub fn placeholder() -> Self {
        Self {
            nombre: "Desconocido".to_string(),
            especialidad: "General".to_string(),
        }
    }
}

impl From<&Doctor> for DoctorDisplay {
    fn from(doctor: &Doctor) -> Self {
        Self {
            nombre: doctor.nombre.clone(),
            especialidad: doctor.especialidad.clone(),
        }
    }
}

/// Response of a doctor reassignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignmentResponse {
    pub doctor_id: Uuid,
    pub doctor: Doctor,
    pub cancelled_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor no encontrado")]
    NotFound,

    #[error("No hay doctores disponibles")]
    NoDoctorsAvailable,

    #[error("No se pudo cancelar la cita activa: {0}")]
    CancellationFailed(String),

    #[error("Error de conexión: {0}")]
    Network(String),
}

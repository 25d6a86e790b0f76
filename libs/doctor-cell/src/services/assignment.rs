// libs/doctor-cell/src/services/assignment.rs
use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{info, warn};
use uuid::Uuid;

use shared_models::{AssignedDoctor, PatientSession, SessionStore};

use crate::models::{Doctor, DoctorError, ReassignmentResponse};
use crate::services::directory::DoctorDirectory;

/// Seam through which reassignment cancels the patient's active
/// appointment; implemented by the scheduling cell.
#[async_trait]
pub trait AppointmentCanceller: Send + Sync {
    async fn cancel_active_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Option<Uuid>, DoctorError>;
}

/// Owns the patient -> doctor relationship: exactly one assignment per
/// patient, replacement on change, display fields cached in the session.
pub struct AssignmentService {
    directory: Arc<dyn DoctorDirectory>,
    sessions: Arc<SessionStore>,
}

impl AssignmentService {
    pub fn new(directory: Arc<dyn DoctorDirectory>, sessions: Arc<SessionStore>) -> Self {
        Self { directory, sessions }
    }

    /// Assign a random available doctor, replacing any prior assignment.
    /// Creates the patient's session on first contact.
    pub async fn assign(&self, patient_id: Uuid, afiliado: bool) -> Result<Doctor, DoctorError> {
        let current = self
            .sessions
            .get(patient_id)
            .and_then(|s| s.assigned_doctor.map(|d| d.doctor_id));

        let doctor = self.pick_random(current).await?;

        let mut session = self
            .sessions
            .get(patient_id)
            .unwrap_or_else(|| PatientSession::new(patient_id, afiliado));
        session.assigned_doctor = Some(AssignedDoctor {
            doctor_id: doctor.id,
            nombre: doctor.nombre.clone(),
            especialidad: doctor.especialidad.clone(),
        });
        self.sessions.put(session);

        info!("Patient {} assigned to doctor {}", patient_id, doctor.id);
        Ok(doctor)
    }

    /// Change the patient's doctor. The cascade is a single server-side
    /// operation and ordering is load-bearing: the active appointment is
    /// cancelled before the new assignment is confirmed, so the patient is
    /// never shown a new doctor while still holding a slot under the old
    /// one.
    pub async fn change_doctor(
        &self,
        patient_id: Uuid,
        canceller: &dyn AppointmentCanceller,
    ) -> Result<ReassignmentResponse, DoctorError> {
        let cancelled = canceller.cancel_active_for_patient(patient_id).await?;
        if let Some(appointment_id) = cancelled {
            info!(
                "Cancelled appointment {} of patient {} ahead of reassignment",
                appointment_id, patient_id
            );
        }

        let session = self.sessions.get(patient_id);
        let afiliado = session.as_ref().map(|s| s.affiliated).unwrap_or(false);

        let doctor = match self.assign(patient_id, afiliado).await {
            Ok(doctor) => doctor,
            Err(e) => {
                warn!(
                    "Reassignment for patient {} failed after cancellation: {}",
                    patient_id, e
                );
                return Err(e);
            }
        };

        Ok(ReassignmentResponse {
            doctor_id: doctor.id,
            doctor,
            cancelled_appointment_id: cancelled,
        })
    }

    async fn pick_random(&self, exclude: Option<Uuid>) -> Result<Doctor, DoctorError> {
        let doctors = self.directory.list_available().await?;

        // Leave the current doctor out when there is anyone else to pick.
        let candidates: Vec<&Doctor> = match exclude {
            Some(current) if doctors.iter().any(|d| d.id != current) => {
                doctors.iter().filter(|d| d.id != current).collect()
            }
            _ => doctors.iter().collect(),
        };

        candidates
            .choose(&mut rand::thread_rng())
            .map(|d| (*d).clone())
            .ok_or(DoctorError::NoDoctorsAvailable)
    }
}

// libs/doctor-cell/src/services/directory.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_backend::{BackendClient, BackendResponse};

use crate::models::{Doctor, DoctorDisplay, DoctorError};

/// Read-only view of the clinic's doctor roster.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn get(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError>;
    async fn list_available(&self) -> Result<Vec<Doctor>, DoctorError>;
}

/// HTTP directory backed by the clinic backend.
pub struct HttpDoctorDirectory {
    backend: Arc<BackendClient>,
}

impl HttpDoctorDirectory {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl DoctorDirectory for HttpDoctorDirectory {
    async fn get(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        let path = format!("/api/doctores/{}", doctor_id);
        debug!("Fetching doctor {}", doctor_id);

        match self.backend.request::<Doctor>(Method::GET, &path, None).await {
            Ok(BackendResponse::Ok(doctor)) => Ok(doctor),
            Ok(BackendResponse::NoContent) => Err(DoctorError::NotFound),
            Err(e) => Err(DoctorError::Network(e.to_string())),
        }
    }

    async fn list_available(&self) -> Result<Vec<Doctor>, DoctorError> {
        match self
            .backend
            .request::<Vec<Doctor>>(Method::GET, "/api/doctores/disponibles", None)
            .await
        {
            Ok(BackendResponse::Ok(doctors)) => {
                Ok(doctors.into_iter().filter(|d| d.disponible).collect())
            }
            Ok(BackendResponse::NoContent) => Ok(Vec::new()),
            Err(e) => Err(DoctorError::Network(e.to_string())),
        }
    }
}

/// Resolve display fields for a set of doctor ids in parallel. Lookups are
/// independent, so one failure degrades that doctor to a placeholder rather
/// than failing the whole batch.
pub async fn resolve_doctor_displays(
    directory: &dyn DoctorDirectory,
    doctor_ids: impl IntoIterator<Item = Uuid>,
) -> HashMap<Uuid, DoctorDisplay> {
    let mut distinct: Vec<Uuid> = doctor_ids.into_iter().collect();
    distinct.sort_unstable();
    distinct.dedup();

    let lookups = distinct.iter().map(|&id| async move {
        match directory.get(id).await {
            Ok(doctor) => (id, DoctorDisplay::from(&doctor)),
            Err(e) => {
                warn!("Doctor lookup for {} failed ({}), using placeholder", id, e);
                (id, DoctorDisplay::placeholder())
            }
        }
    });

    join_all(lookups).await.into_iter().collect()
}

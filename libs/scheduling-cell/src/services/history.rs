// libs/scheduling-cell/src/services/history.rs
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_backend::{BackendClient, BackendResponse};

use crate::models::BookingError;

/// The eligibility gate only needs to know whether a medical-history record
/// exists; the record itself is owned by an external collaborator.
#[async_trait]
pub trait MedicalHistoryProvider: Send + Sync {
    async fn has_history(&self, patient_id: Uuid) -> Result<bool, BookingError>;
}

/// HTTP implementation against the clinic backend. The history endpoint
/// answers 204 for patients without a record.
pub struct MedicalHistoryClient {
    backend: Arc<BackendClient>,
}

impl MedicalHistoryClient {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl MedicalHistoryProvider for MedicalHistoryClient {
    async fn has_history(&self, patient_id: Uuid) -> Result<bool, BookingError> {
        let path = format!("/api/historial/{}", patient_id);
        debug!("Checking medical history for patient {}", patient_id);

        match self
            .backend
            .request::<Value>(Method::GET, &path, None)
            .await
        {
            Ok(BackendResponse::Ok(_)) => Ok(true),
            Ok(BackendResponse::NoContent) => Ok(false),
            Err(e) => Err(BookingError::Network(e.to_string())),
        }
    }
}

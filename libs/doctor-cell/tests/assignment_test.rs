use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::models::{DoctorDisplay, DoctorError};
use doctor_cell::services::assignment::{AppointmentCanceller, AssignmentService};
use doctor_cell::services::directory::{
    resolve_doctor_displays, DoctorDirectory, HttpDoctorDirectory,
};
use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::SessionStore;

fn directory_for(uri: &str) -> HttpDoctorDirectory {
    let config = AppConfig {
        backend_url: uri.to_string(),
        ..AppConfig::default()
    };
    HttpDoctorDirectory::new(Arc::new(BackendClient::new(&config)))
}

fn doctor_json(id: Uuid, nombre: &str, especialidad: &str, disponible: bool) -> serde_json::Value {
    json!({
        "id": id,
        "nombre": nombre,
        "especialidad": especialidad,
        "disponible": disponible,
    })
}

struct RecordingCanceller {
    cancelled: Option<Uuid>,
    calls: AtomicUsize,
}

#[async_trait]
impl AppointmentCanceller for RecordingCanceller {
    async fn cancel_active_for_patient(
        &self,
        _patient_id: Uuid,
    ) -> Result<Option<Uuid>, DoctorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.cancelled)
    }
}

#[tokio::test]
async fn test_get_doctor_from_backend() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/doctores/{}", doctor_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(doctor_json(doctor_id, "Elena Ríos", "Cardiología", true)),
        )
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server.uri());
    let doctor = directory.get(doctor_id).await.unwrap();

    assert_eq!(doctor.id, doctor_id);
    assert_eq!(doctor.nombre, "Elena Ríos");
}

#[tokio::test]
async fn test_missing_doctor_is_not_found() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/doctores/{}", doctor_id)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server.uri());
    let err = directory.get(doctor_id).await.unwrap_err();
    assert_eq!(err, DoctorError::NotFound);
}

#[tokio::test]
async fn test_list_available_filters_unavailable() {
    let mock_server = MockServer::start().await;
    let available = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/api/doctores/disponibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_json(available, "Elena Ríos", "Cardiología", true),
            doctor_json(Uuid::new_v4(), "Marco Peña", "Pediatría", false),
        ])))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server.uri());
    let doctors = directory.list_available().await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].id, available);
}

#[tokio::test]
async fn test_resolve_displays_degrades_per_doctor() {
    let mock_server = MockServer::start().await;
    let known = Uuid::new_v4();
    let broken = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/api/doctores/{}", known)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(doctor_json(known, "Elena Ríos", "Cardiología", true)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/doctores/{}", broken)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let directory = directory_for(&mock_server.uri());
    let displays = resolve_doctor_displays(&directory, vec![known, broken, known]).await;

    assert_eq!(displays.len(), 2);
    assert_eq!(displays[&known].nombre, "Elena Ríos");
    assert_eq!(displays[&broken], DoctorDisplay::placeholder());
}

#[tokio::test]
async fn test_assign_creates_session_with_doctor() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/api/doctores/disponibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_json(doctor_id, "Elena Ríos", "Cardiología", true),
        ])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sessions = Arc::new(SessionStore::load(dir.path().join("sessions.json")));
    let service = AssignmentService::new(
        Arc::new(directory_for(&mock_server.uri())),
        Arc::clone(&sessions),
    );

    let patient_id = Uuid::new_v4();
    let doctor = service.assign(patient_id, true).await.unwrap();
    assert_eq!(doctor.id, doctor_id);

    let session = sessions.get(patient_id).unwrap();
    assert!(session.affiliated);
    assert_eq!(session.assigned_doctor.unwrap().doctor_id, doctor_id);
}

#[tokio::test]
async fn test_reassignment_picks_a_different_doctor() {
    let mock_server = MockServer::start().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path("/api/doctores/disponibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_json(first, "Elena Ríos", "Cardiología", true),
            doctor_json(second, "Marco Peña", "Pediatría", true),
        ])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sessions = Arc::new(SessionStore::load(dir.path().join("sessions.json")));
    let service = AssignmentService::new(
        Arc::new(directory_for(&mock_server.uri())),
        Arc::clone(&sessions),
    );

    let patient_id = Uuid::new_v4();
    let assigned = service.assign(patient_id, false).await.unwrap();

    let cancelled_id = Uuid::new_v4();
    let canceller = RecordingCanceller {
        cancelled: Some(cancelled_id),
        calls: AtomicUsize::new(0),
    };

    let response = service
        .change_doctor(patient_id, &canceller)
        .await
        .unwrap();

    assert_eq!(canceller.calls.load(Ordering::SeqCst), 1);
    assert_eq!(response.cancelled_appointment_id, Some(cancelled_id));
    // With an alternative on the roster, the current doctor is never re-picked.
    assert_ne!(response.doctor_id, assigned.id);

    let session = sessions.get(patient_id).unwrap();
    assert_eq!(
        session.assigned_doctor.unwrap().doctor_id,
        response.doctor_id
    );
}

#[tokio::test]
async fn test_reassignment_with_empty_roster_fails() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/doctores/disponibles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let sessions = Arc::new(SessionStore::load(dir.path().join("sessions.json")));
    let service = AssignmentService::new(
        Arc::new(directory_for(&mock_server.uri())),
        sessions,
    );

    let err = service.assign(Uuid::new_v4(), false).await.unwrap_err();
    assert_eq!(err, DoctorError::NoDoctorsAvailable);
}

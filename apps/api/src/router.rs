use std::sync::Arc;

use axum::{routing::get, Router};

use doctor_cell::handlers::DoctorState;
use doctor_cell::router::doctor_routes;
use doctor_cell::services::assignment::AssignmentService;
use doctor_cell::services::directory::{DoctorDirectory, HttpDoctorDirectory};
use scheduling_cell::handlers::SchedulingState;
use scheduling_cell::router::scheduling_routes;
use scheduling_cell::services::booking::BookingService;
use scheduling_cell::services::history::MedicalHistoryClient;
use scheduling_cell::services::notify::TracingNotifier;
use scheduling_cell::services::pricing::PricingRates;
use scheduling_cell::services::slots::SlotRepository;
use shared_backend::BackendClient;
use shared_config::AppConfig;
use shared_models::SessionStore;

pub fn create_router(config: &AppConfig) -> Router {
    let backend = Arc::new(BackendClient::new(config));
    let sessions = Arc::new(SessionStore::load(&config.session_store_path));
    let directory: Arc<dyn DoctorDirectory> =
        Arc::new(HttpDoctorDirectory::new(Arc::clone(&backend)));

    let slots = Arc::new(SlotRepository::new());
    let booking = Arc::new(BookingService::new(
        Arc::clone(&slots),
        Arc::new(MedicalHistoryClient::new(Arc::clone(&backend))),
        Arc::new(TracingNotifier),
    ));

    let assignment = Arc::new(AssignmentService::new(
        Arc::clone(&directory),
        Arc::clone(&sessions),
    ));

    let scheduling_state = SchedulingState {
        slots: Arc::clone(&slots),
        booking: Arc::clone(&booking),
        sessions: Arc::clone(&sessions),
        directory: Arc::clone(&directory),
        rates: PricingRates::from_config(config),
    };

    let doctor_state = DoctorState {
        directory,
        assignment,
        // BookingService doubles as the canceller behind reassignment.
        canceller: booking,
    };

    Router::new()
        .route("/", get(|| async { "Portal de Citas API is running!" }))
        .nest("/api/citas", scheduling_routes(scheduling_state))
        .nest("/api/doctores", doctor_routes(doctor_state))
}

// libs/scheduling-cell/src/services/booking.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use doctor_cell::models::DoctorError;
use doctor_cell::services::assignment::AppointmentCanceller;

use crate::models::{Appointment, AppointmentStatus, BookingError};
use crate::services::eligibility::EligibilityGate;
use crate::services::history::MedicalHistoryProvider;
use crate::services::notify::{NotificationEvent, NotificationSink};
use crate::services::slots::{CancelOutcome, ClaimGuard, SlotRepository};

/// Orchestrates the appointment lifecycle: `None -> Scheduled ->
/// {Completed (derived) | Cancelled}`. Rescheduling always creates a new
/// appointment instance and cancels the old one; it never mutates a slot or
/// time in place.
pub struct BookingService {
    slots: Arc<SlotRepository>,
    gate: EligibilityGate,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingService {
    pub fn new(
        slots: Arc<SlotRepository>,
        history: Arc<dyn MedicalHistoryProvider>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            slots,
            gate: EligibilityGate::new(history),
            notifier,
        }
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    /// Book a new appointment. Preconditions run before any slot is
    /// touched: completed medical history, and no active appointment.
    pub async fn book_new(
        &self,
        patient_id: Uuid,
        slot_id: Uuid,
    ) -> Result<Appointment, BookingError> {
        info!("Booking slot {} for patient {}", slot_id, patient_id);

        if !self.gate.has_completed_history(patient_id).await? {
            return Err(BookingError::HistoryIncomplete);
        }

        let now = Utc::now();
        let appointments = self.slots.appointments_for_patient(patient_id);
        if self.gate.has_active_appointment(&appointments, now).is_some() {
            return Err(BookingError::AlreadyHasActiveAppointment);
        }

        // The claim re-checks the single-active invariant inside its
        // critical section; the gate check above is the friendly fast path.
        let appointment = self
            .slots
            .claim(slot_id, patient_id, ClaimGuard::RejectIfActive)?;

        self.notify(NotificationEvent::Booked {
            patient_id,
            appointment_id: appointment.id,
        });

        Ok(appointment)
    }

    /// Cancel an appointment and free its slot. Idempotent: cancelling an
    /// already-cancelled appointment is a no-op success, matching the
    /// optimistic re-fetch behavior of the portal client.
    pub async fn cancel(&self, appointment_id: Uuid) -> Result<(), BookingError> {
        debug!("Cancelling appointment {}", appointment_id);

        match self.slots.cancel_appointment(appointment_id)? {
            CancelOutcome::Cancelled => {
                if let Some(appointment) = self.slots.get_appointment(appointment_id) {
                    self.notify(NotificationEvent::Cancelled {
                        patient_id: appointment.patient_id,
                        appointment_id,
                    });
                }
            }
            CancelOutcome::AlreadyCancelled => {
                debug!("Appointment {} was already cancelled", appointment_id);
            }
        }

        Ok(())
    }

    /// Replace an existing appointment with a new slot. The swap runs as one
    /// repository operation: the new slot is claimed and the old appointment
    /// cancelled in a single critical section, so a failed claim leaves the
    /// old appointment untouched and two concurrent reschedules of the same
    /// appointment cannot both win. The two-hour cutoff is enforced here,
    /// not only in the calling UI.
    pub async fn reschedule(
        &self,
        current_appointment_id: Uuid,
        new_slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Appointment, BookingError> {
        info!(
            "Rescheduling appointment {} to slot {} for patient {}",
            current_appointment_id, new_slot_id, patient_id
        );

        let current = self
            .slots
            .get_appointment(current_appointment_id)
            .ok_or(BookingError::NotFound)?;

        if current.patient_id != patient_id || current.estado == AppointmentStatus::Cancelled {
            return Err(BookingError::NotFound);
        }

        let now = Utc::now();
        if !self.gate.is_reschedulable(&current, now) {
            return Err(BookingError::TooLateToReschedule);
        }

        if !self.gate.has_completed_history(patient_id).await? {
            return Err(BookingError::HistoryIncomplete);
        }

        // The checks above are a fast path over a stale read; the swap
        // re-verifies the old appointment under the repository lock.
        let new_appointment =
            self.slots
                .claim_replacing(current_appointment_id, new_slot_id, patient_id)?;

        self.notify(NotificationEvent::Rescheduled {
            patient_id,
            old_appointment_id: current_appointment_id,
            new_appointment_id: new_appointment.id,
        });

        Ok(new_appointment)
    }

    /// Cancel the patient's active appointment, if any, returning its id.
    /// Used by the doctor-reassignment cascade.
    pub async fn cancel_active(&self, patient_id: Uuid) -> Result<Option<Uuid>, BookingError> {
        let now = Utc::now();
        let appointments = self.slots.appointments_for_patient(patient_id);
        let active_id = self
            .gate
            .has_active_appointment(&appointments, now)
            .map(|a| a.id);

        match active_id {
            Some(id) => {
                self.cancel(id).await?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn notify(&self, event: NotificationEvent) {
        // Fire-and-forget: a slow or failing sink never delays the caller.
        let sink = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            sink.dispatch(event).await;
        });
    }
}

#[async_trait]
impl AppointmentCanceller for BookingService {
    async fn cancel_active_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Option<Uuid>, DoctorError> {
        self.cancel_active(patient_id)
            .await
            .map_err(|e| DoctorError::CancellationFailed(e.to_string()))
    }
}

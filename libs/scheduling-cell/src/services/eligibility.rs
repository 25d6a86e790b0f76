// libs/scheduling-cell/src/services/eligibility.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, BookingError};
use crate::services::history::MedicalHistoryProvider;

/// Minimum lead time, in hours, before an appointment may be rescheduled.
pub const RESCHEDULE_CUTOFF_HOURS: i64 = 2;

/// Precondition checks run before every lifecycle-changing call. Pure
/// predicate evaluation over supplied data; never mutates anything.
pub struct EligibilityGate {
    history: Arc<dyn MedicalHistoryProvider>,
}

impl EligibilityGate {
    pub fn new(history: Arc<dyn MedicalHistoryProvider>) -> Self {
        Self { history }
    }

    /// Completed medical intake is the gate for every booking operation.
    pub async fn has_completed_history(&self, patient_id: Uuid) -> Result<bool, BookingError> {
        let exists = self.history.has_history(patient_id).await?;
        debug!("History check for patient {}: {}", patient_id, exists);
        Ok(exists)
    }

    /// The patient's one allowed active appointment, if any. Active is
    /// re-derived at read time, so a completed-but-unflipped record never
    /// counts.
    pub fn has_active_appointment<'a>(
        &self,
        appointments: &'a [Appointment],
        now: DateTime<Utc>,
    ) -> Option<&'a Appointment> {
        appointments.iter().find(|a| a.is_active(now))
    }

    /// Gating rule for the reschedule action: at least two hours of lead
    /// time must remain. Also re-validated inside `reschedule` itself, so
    /// the guarantee holds for non-UI callers.
    pub fn is_reschedulable(&self, appointment: &Appointment, now: DateTime<Utc>) -> bool {
        appointment.scheduled_at() - now >= Duration::hours(RESCHEDULE_CUTOFF_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use async_trait::async_trait;
    use chrono::Duration;

    struct FixedHistory(bool);

    #[async_trait]
    impl MedicalHistoryProvider for FixedHistory {
        async fn has_history(&self, _patient_id: Uuid) -> Result<bool, BookingError> {
            Ok(self.0)
        }
    }

    fn appointment_at(offset: Duration, estado: AppointmentStatus) -> Appointment {
        let when = Utc::now() + offset;
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            slot_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            fecha: when.date_naive(),
            hora: when.time(),
            estado,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn gate() -> EligibilityGate {
        EligibilityGate::new(Arc::new(FixedHistory(true)))
    }

    #[test]
    fn test_future_scheduled_appointment_is_active() {
        let appointments = vec![appointment_at(Duration::days(2), AppointmentStatus::Scheduled)];
        assert!(gate()
            .has_active_appointment(&appointments, Utc::now())
            .is_some());
    }

    #[test]
    fn test_past_scheduled_appointment_is_not_active() {
        // Stored status never flipped, but derived status is Completed.
        let appointments = vec![appointment_at(-Duration::hours(3), AppointmentStatus::Scheduled)];
        assert!(gate()
            .has_active_appointment(&appointments, Utc::now())
            .is_none());
    }

    #[test]
    fn test_cancelled_appointment_is_not_active() {
        let appointments = vec![appointment_at(Duration::days(2), AppointmentStatus::Cancelled)];
        assert!(gate()
            .has_active_appointment(&appointments, Utc::now())
            .is_none());
    }

    #[test]
    fn test_reschedulable_outside_cutoff() {
        let appointment = appointment_at(Duration::hours(3), AppointmentStatus::Scheduled);
        assert!(gate().is_reschedulable(&appointment, Utc::now()));
    }

    #[test]
    fn test_not_reschedulable_at_90_minutes() {
        let appointment = appointment_at(Duration::minutes(90), AppointmentStatus::Scheduled);
        assert!(!gate().is_reschedulable(&appointment, Utc::now()));
    }

    #[tokio::test]
    async fn test_history_gate_delegates_to_provider() {
        let without = EligibilityGate::new(Arc::new(FixedHistory(false)));
        assert!(!without.has_completed_history(Uuid::new_v4()).await.unwrap());

        let with = EligibilityGate::new(Arc::new(FixedHistory(true)));
        assert!(with.has_completed_history(Uuid::new_v4()).await.unwrap());
    }
}

// libs/scheduling-cell/src/services/notify.rs
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Lifecycle events dispatched after a successful mutation. Delivery is
/// fire-and-forget; transport lives outside this cell.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Booked {
        patient_id: Uuid,
        appointment_id: Uuid,
    },
    Cancelled {
        patient_id: Uuid,
        appointment_id: Uuid,
    },
    Rescheduled {
        patient_id: Uuid,
        old_appointment_id: Uuid,
        new_appointment_id: Uuid,
    },
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn dispatch(&self, event: NotificationEvent);
}

/// Default sink: records the event in the trace stream.
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn dispatch(&self, event: NotificationEvent) {
        match event {
            NotificationEvent::Booked {
                patient_id,
                appointment_id,
            } => info!(
                "Notification: appointment {} booked for patient {}",
                appointment_id, patient_id
            ),
            NotificationEvent::Cancelled {
                patient_id,
                appointment_id,
            } => info!(
                "Notification: appointment {} cancelled for patient {}",
                appointment_id, patient_id
            ),
            NotificationEvent::Rescheduled {
                patient_id,
                old_appointment_id,
                new_appointment_id,
            } => info!(
                "Notification: patient {} moved appointment {} to {}",
                patient_id, old_appointment_id, new_appointment_id
            ),
        }
    }
}

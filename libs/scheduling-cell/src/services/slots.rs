// libs/scheduling-cell/src/services/slots.rs
use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, BookingError, SeedSlotRequest, Slot, SlotStatus};

/// Whether a claim must reject patients that already hold an active
/// appointment. Rescheduling legitimately claims while one is still held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimGuard {
    RejectIfActive,
    AllowActive,
}

/// Outcome of a cancellation, distinguishing the idempotent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
}

struct ScheduleState {
    slots: HashMap<Uuid, Slot>,
    appointments: HashMap<Uuid, Appointment>,
}

/// Source of truth for slots and the appointments bound to them.
///
/// Every state transition runs inside one mutex critical section, so a claim
/// is a single serializable operation: of N concurrent claims on the same
/// Available slot, exactly one observes `DISPONIBLE` and wins.
pub struct SlotRepository {
    state: Mutex<ScheduleState>,
}

impl SlotRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ScheduleState {
                slots: HashMap::new(),
                appointments: HashMap::new(),
            }),
        }
    }

    /// Administrative seeding. Slots start out Available.
    pub fn seed_slots(&self, requests: Vec<SeedSlotRequest>) -> Vec<Slot> {
        let mut state = self.lock();
        let mut created = Vec::with_capacity(requests.len());

        for req in requests {
            let slot = Slot {
                id: Uuid::new_v4(),
                doctor_id: req.doctor_id,
                fecha: req.fecha,
                hora: req.hora,
                estado: SlotStatus::Available,
            };
            state.slots.insert(slot.id, slot.clone());
            created.push(slot);
        }

        info!("Seeded {} slots", created.len());
        created
    }

    /// Open slots for a doctor within an inclusive date range, ordered by
    /// (fecha, hora). Read-consistent with `claim`: anything returned here
    /// was Available at the time of the snapshot.
    pub fn list_available(
        &self,
        doctor_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<Slot> {
        let state = self.lock();

        let mut slots: Vec<Slot> = state
            .slots
            .values()
            .filter(|s| s.doctor_id == doctor_id && s.estado == SlotStatus::Available)
            .filter(|s| from.map_or(true, |d| s.fecha >= d))
            .filter(|s| to.map_or(true, |d| s.fecha <= d))
            .cloned()
            .collect();

        slots.sort_by_key(|s| (s.fecha, s.hora));
        slots
    }

    pub fn get_slot(&self, slot_id: Uuid) -> Option<Slot> {
        self.lock().slots.get(&slot_id).cloned()
    }

    /// Atomically transition a slot `DISPONIBLE -> OCUPADA` and create the
    /// appointment record. Fails with `SlotUnavailable` when the slot has
    /// been taken, cancelled, or never existed, and the losing caller is
    /// expected to re-fetch the slot list rather than retry blindly.
    ///
    /// With `ClaimGuard::RejectIfActive` the single-active-appointment
    /// invariant is re-checked inside the critical section, so two
    /// concurrent bookings by one patient cannot both succeed.
    pub fn claim(
        &self,
        slot_id: Uuid,
        patient_id: Uuid,
        guard: ClaimGuard,
    ) -> Result<Appointment, BookingError> {
        let now = Utc::now();
        let mut state = self.lock();

        if guard == ClaimGuard::RejectIfActive {
            let has_active = state
                .appointments
                .values()
                .any(|a| a.patient_id == patient_id && a.is_active(now));
            if has_active {
                return Err(BookingError::AlreadyHasActiveAppointment);
            }
        }

        let slot = state
            .slots
            .get_mut(&slot_id)
            .ok_or(BookingError::SlotUnavailable)?;

        if slot.estado != SlotStatus::Available {
            debug!("Claim rejected, slot {} is {}", slot_id, slot.estado);
            return Err(BookingError::SlotUnavailable);
        }

        slot.estado = SlotStatus::Booked;
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            slot_id,
            doctor_id: slot.doctor_id,
            fecha: slot.fecha,
            hora: slot.hora,
            estado: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        state.appointments.insert(appointment.id, appointment.clone());

        info!(
            "Slot {} claimed by patient {} as appointment {}",
            slot_id, patient_id, appointment.id
        );
        Ok(appointment)
    }

    /// Atomically replace an appointment: claim the new slot, cancel the old
    /// appointment, and free its slot, all in one critical section. The old
    /// appointment is re-verified as Scheduled under the lock, so two
    /// concurrent replacements of the same appointment cannot both succeed;
    /// the loser observes it already Cancelled and gets `NotFound` with the
    /// new slot untouched.
    pub fn claim_replacing(
        &self,
        old_appointment_id: Uuid,
        new_slot_id: Uuid,
        patient_id: Uuid,
    ) -> Result<Appointment, BookingError> {
        let now = Utc::now();
        let mut state = self.lock();

        match state.appointments.get(&old_appointment_id) {
            Some(old)
                if old.patient_id == patient_id
                    && old.estado != AppointmentStatus::Cancelled => {}
            _ => return Err(BookingError::NotFound),
        }

        let (doctor_id, fecha, hora) = {
            let slot = state
                .slots
                .get_mut(&new_slot_id)
                .ok_or(BookingError::SlotUnavailable)?;
            if slot.estado != SlotStatus::Available {
                debug!("Replacement rejected, slot {} is {}", new_slot_id, slot.estado);
                return Err(BookingError::SlotUnavailable);
            }
            slot.estado = SlotStatus::Booked;
            (slot.doctor_id, slot.fecha, slot.hora)
        };

        let replacement = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            slot_id: new_slot_id,
            doctor_id,
            fecha,
            hora,
            estado: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        state.appointments.insert(replacement.id, replacement.clone());

        let old_slot_id = match state.appointments.get_mut(&old_appointment_id) {
            Some(old) => {
                old.estado = AppointmentStatus::Cancelled;
                old.updated_at = now;
                Some(old.slot_id)
            }
            None => None,
        };
        if let Some(slot_id) = old_slot_id {
            if let Some(slot) = state.slots.get_mut(&slot_id) {
                if slot.estado == SlotStatus::Booked {
                    slot.estado = SlotStatus::Available;
                }
            }
        }

        info!(
            "Appointment {} replaced by {} on slot {} for patient {}",
            old_appointment_id, replacement.id, new_slot_id, patient_id
        );
        Ok(replacement)
    }

    /// Transition a slot `OCUPADA -> DISPONIBLE`. Only a booked slot can be
    /// released; anything else is a no-op so release never double-frees.
    pub fn release(&self, slot_id: Uuid) -> Result<(), BookingError> {
        let mut state = self.lock();
        let slot = state
            .slots
            .get_mut(&slot_id)
            .ok_or(BookingError::NotFound)?;

        if slot.estado == SlotStatus::Booked {
            slot.estado = SlotStatus::Available;
            debug!("Slot {} released", slot_id);
        }
        Ok(())
    }

    /// Cancel an appointment and free its slot in one critical section.
    /// Idempotent: cancelling an already-cancelled appointment reports
    /// `AlreadyCancelled` and leaves the slot untouched.
    pub fn cancel_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<CancelOutcome, BookingError> {
        let mut state = self.lock();

        let appointment = state
            .appointments
            .get_mut(&appointment_id)
            .ok_or(BookingError::NotFound)?;

        if appointment.estado == AppointmentStatus::Cancelled {
            return Ok(CancelOutcome::AlreadyCancelled);
        }

        appointment.estado = AppointmentStatus::Cancelled;
        appointment.updated_at = Utc::now();
        let slot_id = appointment.slot_id;

        match state.slots.get_mut(&slot_id) {
            Some(slot) if slot.estado == SlotStatus::Booked => {
                slot.estado = SlotStatus::Available;
            }
            Some(_) => {}
            None => warn!("Appointment {} references missing slot {}", appointment_id, slot_id),
        }

        info!("Appointment {} cancelled, slot {} freed", appointment_id, slot_id);
        Ok(CancelOutcome::Cancelled)
    }

    /// Cancel an appointment without releasing its slot; the slot becomes
    /// terminally `CANCELADA`. Used when doctor time is withdrawn outright.
    pub fn cancel_slot(&self, slot_id: Uuid) -> Result<(), BookingError> {
        let mut state = self.lock();
        let slot = state
            .slots
            .get_mut(&slot_id)
            .ok_or(BookingError::NotFound)?;

        if slot.estado != SlotStatus::Booked {
            return Err(BookingError::SlotUnavailable);
        }
        slot.estado = SlotStatus::Cancelled;

        let appointment_ids: Vec<Uuid> = state
            .appointments
            .values()
            .filter(|a| a.slot_id == slot_id && a.estado == AppointmentStatus::Scheduled)
            .map(|a| a.id)
            .collect();
        let now = Utc::now();
        for id in appointment_ids {
            if let Some(appointment) = state.appointments.get_mut(&id) {
                appointment.estado = AppointmentStatus::Cancelled;
                appointment.updated_at = now;
            }
        }

        info!("Slot {} cancelled without release", slot_id);
        Ok(())
    }

    pub fn get_appointment(&self, appointment_id: Uuid) -> Option<Appointment> {
        self.lock().appointments.get(&appointment_id).cloned()
    }

    /// All of a patient's appointments regardless of status, ordered
    /// ascending by date/time. The backend contract guarantees no ordering,
    /// so ordering is applied here at the read edge.
    pub fn appointments_for_patient(&self, patient_id: Uuid) -> Vec<Appointment> {
        let state = self.lock();
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();

        appointments.sort_by_key(|a| (a.fecha, a.hora));
        appointments
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScheduleState> {
        // A poisoned mutex only happens after a panic mid-transition; the
        // scheduling state is still the best data available, so recover.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SlotRepository {
    fn default() -> Self {
        Self::new()
    }
}

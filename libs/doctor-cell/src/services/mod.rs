pub mod assignment;
pub mod directory;

pub use assignment::{AppointmentCanceller, AssignmentService};
pub use directory::{resolve_doctor_displays, DoctorDirectory, HttpDoctorDirectory};

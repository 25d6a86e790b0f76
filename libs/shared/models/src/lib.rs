pub mod error;
pub mod session;

pub use error::AppError;
pub use session::{AssignedDoctor, PatientSession, SessionStore};
